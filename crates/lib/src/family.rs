//! # Family Binding
//!
//! Binding is symmetric: A lists B iff B lists A. Both sides are changed in
//! the same store transaction.

use crate::{errors::StoreError, store::Store, types::AccountView};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BindRequest {
    pub user_id: String,
    pub target_phone: String,
}

/// Binds the account `user_id` to the account registered under `target_phone`.
pub async fn bind(store: &Store, request: BindRequest) -> Result<AccountView, StoreError> {
    let view = store
        .transaction(move |db| {
            let user_idx = db.users.iter().position(|u| u.id == request.user_id);
            let target_idx = db.users.iter().position(|u| u.phone == request.target_phone);
            let (Some(user_idx), Some(target_idx)) = (user_idx, target_idx) else {
                return Err(StoreError::NotFound(
                    "User or target not found".to_string(),
                ));
            };
            if user_idx == target_idx {
                return Err(StoreError::Validation(
                    "An account cannot be bound to itself".to_string(),
                ));
            }

            let user_phone = db.users[user_idx].phone.clone();
            let target_phone = db.users[target_idx].phone.clone();
            if !db.users[user_idx].bound_phones.contains(&target_phone) {
                db.users[user_idx].bound_phones.push(target_phone);
            }
            if !db.users[target_idx].bound_phones.contains(&user_phone) {
                db.users[target_idx].bound_phones.push(user_phone);
            }
            Ok(AccountView::from(&db.users[user_idx]))
        })
        .await?;

    info!(user_id = %view.id, bound = view.bound_phones.len(), "Bound family member.");
    Ok(view)
}

/// Removes the binding between `user_id` and `target_phone` on both sides.
///
/// The target may already be gone; the user's side is cleaned regardless.
pub async fn unbind(store: &Store, request: BindRequest) -> Result<AccountView, StoreError> {
    store
        .transaction(move |db| {
            let user_idx = db
                .users
                .iter()
                .position(|u| u.id == request.user_id)
                .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;
            let user_phone = db.users[user_idx].phone.clone();
            db.users[user_idx]
                .bound_phones
                .retain(|p| p != &request.target_phone);
            if let Some(target) = db
                .users
                .iter_mut()
                .find(|u| u.phone == request.target_phone)
            {
                target.bound_phones.retain(|p| p != &user_phone);
            }
            Ok(AccountView::from(&db.users[user_idx]))
        })
        .await
}
