use crate::{errors::StoreError, store::Storage, types::Database};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// An in-memory backend, mainly for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    db: Arc<Mutex<Database>>,
}

impl MemoryStorage {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> Result<Database, StoreError> {
        let db = self
            .db
            .lock()
            .map_err(|_| StoreError::Io(std::io::Error::other("memory store poisoned")))?;
        Ok(db.clone())
    }

    async fn save(&self, db: &Database) -> Result<(), StoreError> {
        let mut current = self
            .db
            .lock()
            .map_err(|_| StoreError::Io(std::io::Error::other("memory store poisoned")))?;
        *current = db.clone();
        Ok(())
    }
}
