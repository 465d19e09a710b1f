//! # Care Messages
//!
//! Messages wait in `pending` until the recipient's dialogue session relays
//! them and marks them `delivered`.

use crate::{
    errors::StoreError,
    new_record_id, require,
    store::Store,
    types::{Message, MessageKind, MessageStatus},
};
use chrono::Utc;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewMessage {
    pub from_user_id: String,
    pub target_phone: String,
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatusUpdate {
    pub status: MessageStatus,
}

pub async fn send(store: &Store, new: NewMessage) -> Result<Message, StoreError> {
    require(&new.target_phone, "targetPhone")?;
    require(&new.content, "content")?;

    store
        .transaction(move |db| {
            let message = Message {
                id: new_record_id(),
                from_user_id: new.from_user_id,
                target_phone: new.target_phone,
                content: new.content,
                kind: new.kind,
                status: MessageStatus::Pending,
                timestamp: Utc::now(),
            };
            db.messages.push(message.clone());
            Ok(message)
        })
        .await
}

/// Messages addressed to `phone` that have not been delivered yet.
pub async fn pending_for(store: &Store, phone: &str) -> Result<Vec<Message>, StoreError> {
    let db = store.snapshot().await?;
    Ok(db
        .messages
        .into_iter()
        .filter(|m| m.target_phone == phone && m.status == MessageStatus::Pending)
        .collect())
}

pub async fn set_status(
    store: &Store,
    id: &str,
    status: MessageStatus,
) -> Result<Message, StoreError> {
    let id = id.to_string();
    store
        .transaction(move |db| {
            let message = db
                .messages
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| StoreError::NotFound("Not found".to_string()))?;
            message.status = status;
            Ok(message.clone())
        })
        .await
}
