//! # Record Store
//!
//! The persisted state is one [`Database`] document. Backends implement the
//! small [`Storage`] trait (load the whole document, save the whole document);
//! [`Store`] wraps a backend and runs every mutation as a read-modify-write
//! transaction behind a single-writer lock, so concurrent requests cannot
//! overwrite each other's changes.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

use crate::{errors::StoreError, types::Database};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

/// A backend that can load and save the whole document.
#[async_trait]
pub trait Storage: Send + Sync + DynClone + Debug {
    /// Returns the name of the backend (e.g., "json-file", "memory").
    fn name(&self) -> &str;

    /// Reads the current document.
    async fn load(&self) -> Result<Database, StoreError>;

    /// Replaces the persisted document.
    async fn save(&self, db: &Database) -> Result<(), StoreError>;
}

dyn_clone::clone_trait_object!(Storage);

/// Transactional access to the document.
#[derive(Debug)]
pub struct Store {
    backend: Box<dyn Storage>,
    lock: Mutex<()>,
}

impl Store {
    pub fn new(backend: Box<dyn Storage>) -> Self {
        Self {
            backend,
            lock: Mutex::new(()),
        }
    }

    /// A store backed by the JSON file at `path`.
    pub fn json_file(path: impl AsRef<Path>) -> Self {
        Self::new(Box::new(JsonFileStorage::new(path)))
    }

    /// A store that only lives in memory.
    pub fn in_memory(db: Database) -> Self {
        Self::new(Box::new(MemoryStorage::new(db)))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Returns a copy of the current document.
    pub async fn snapshot(&self) -> Result<Database, StoreError> {
        let _guard = self.lock.lock().await;
        self.backend.load().await
    }

    /// Runs `f` against the current document and persists the result.
    ///
    /// If `f` returns an error nothing is written. The lock is held from the
    /// load until the save completes.
    pub async fn transaction<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Database) -> Result<T, StoreError> + Send,
        T: Send,
    {
        let _guard = self.lock.lock().await;
        let mut db = self.backend.load().await?;
        let output = f(&mut db)?;
        self.backend.save(&db).await?;
        debug!(backend = self.backend.name(), "Store transaction committed.");
        Ok(output)
    }
}
