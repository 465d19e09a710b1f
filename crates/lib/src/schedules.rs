//! # Schedules
//!
//! Life tasks and medication reminders, keyed by the owner's phone.

use crate::{
    errors::StoreError,
    new_record_id, require,
    store::Store,
    types::{ScheduleItem, ScheduleKind, ScheduleStatus},
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewSchedule {
    pub user_id: String,
    pub title: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: ScheduleKind,
    pub created_by: String,
}

/// A partial update. Only the supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScheduleUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<ScheduleKind>,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
}

pub async fn list(store: &Store, phone: &str) -> Result<Vec<ScheduleItem>, StoreError> {
    let db = store.snapshot().await?;
    Ok(db
        .schedules
        .into_iter()
        .filter(|s| s.user_id == phone)
        .collect())
}

pub async fn create(store: &Store, new: NewSchedule) -> Result<ScheduleItem, StoreError> {
    require(&new.user_id, "userId")?;
    require(&new.title, "title")?;
    require(&new.time, "time")?;

    store
        .transaction(move |db| {
            let item = ScheduleItem {
                id: new_record_id(),
                user_id: new.user_id,
                title: new.title,
                time: new.time,
                kind: new.kind,
                status: ScheduleStatus::Pending,
                created_by: new.created_by,
            };
            db.schedules.push(item.clone());
            Ok(item)
        })
        .await
}

pub async fn update(
    store: &Store,
    id: &str,
    update: ScheduleUpdate,
) -> Result<ScheduleItem, StoreError> {
    let id = id.to_string();
    store
        .transaction(move |db| {
            let item = db
                .schedules
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| StoreError::NotFound("Not found".to_string()))?;
            if let Some(title) = update.title {
                item.title = title;
            }
            if let Some(time) = update.time {
                item.time = time;
            }
            if let Some(kind) = update.kind {
                item.kind = kind;
            }
            if let Some(status) = update.status {
                item.status = status;
            }
            Ok(item.clone())
        })
        .await
}

/// Deletes the item if it exists. Deleting an unknown id is not an error.
pub async fn delete(store: &Store, id: &str) -> Result<(), StoreError> {
    let id = id.to_string();
    store
        .transaction(move |db| {
            db.schedules.retain(|s| s.id != id);
            Ok(())
        })
        .await
}
