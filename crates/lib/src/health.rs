//! # Health Logs
//!
//! Append-only readings recorded by the subject and read by bound family.

use crate::{
    errors::StoreError,
    new_record_id, require,
    store::Store,
    types::{HealthLog, HealthMetric},
};
use chrono::Utc;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewHealthLog {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: HealthMetric,
    pub value: String,
}

pub async fn create(store: &Store, new: NewHealthLog) -> Result<HealthLog, StoreError> {
    require(&new.user_id, "userId")?;
    require(&new.value, "value")?;

    store
        .transaction(move |db| {
            let log = HealthLog {
                id: new_record_id(),
                user_id: new.user_id,
                kind: new.kind,
                value: new.value,
                timestamp: Utc::now(),
            };
            db.health_logs.push(log.clone());
            Ok(log)
        })
        .await
}

pub async fn list(store: &Store, phone: &str) -> Result<Vec<HealthLog>, StoreError> {
    let db = store.snapshot().await?;
    Ok(db
        .health_logs
        .into_iter()
        .filter(|l| l.user_id == phone)
        .collect())
}
