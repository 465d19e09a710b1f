pub mod analysis;
pub mod factory;
