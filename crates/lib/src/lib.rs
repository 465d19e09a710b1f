//! # Family Care
//!
//! Domain core of the family-care backend: a JSON document store for
//! accounts, bindings, schedules, health logs, messages and sentiment
//! reports; the upload router that separates analysis artifacts from public
//! files; and the sentiment aggregator that turns recorded dialogue into
//! daily per-account reports.

pub mod accounts;
pub mod aggregator;
pub mod artifacts;
pub mod avatar;
pub mod constants;
pub mod errors;
pub mod family;
pub mod health;
pub mod messages;
pub mod providers;
pub mod reports;
pub mod schedules;
pub mod store;
pub mod transcode;
pub mod types;
pub mod uploads;

pub use aggregator::{SentimentAggregator, SyncOutcome};
pub use artifacts::PendingArea;
pub use errors::{AggregateError, AnalysisError, StoreError, UploadError};
pub use store::Store;
pub use uploads::UploadRouter;

use uuid::Uuid;

/// A fresh record id. Hyphen-free, since account ids end up inside artifact filenames.
pub fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Rejects a blank required field.
pub fn require(value: &str, field: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}
