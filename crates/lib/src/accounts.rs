//! # Accounts
//!
//! Registration, login and profile changes. Login is a plain equality check
//! of phone and password; no session is created on the server.

use crate::{
    errors::StoreError,
    new_record_id, require,
    store::Store,
    types::{Account, AccountSummary, AccountView, Role},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Credentials {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Registration {
    pub phone: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

/// The fields a user may change on their own profile. Absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

pub async fn login(store: &Store, credentials: &Credentials) -> Result<AccountView, StoreError> {
    let db = store.snapshot().await?;
    db.users
        .iter()
        .find(|u| u.phone == credentials.phone && u.password == credentials.password)
        .map(AccountView::from)
        .ok_or_else(|| StoreError::Unauthorized("Invalid phone or password".to_string()))
}

pub async fn register(
    store: &Store,
    registration: Registration,
) -> Result<AccountView, StoreError> {
    require(&registration.phone, "phone")?;
    require(&registration.name, "name")?;
    require(&registration.password, "password")?;

    let account = store
        .transaction(move |db| {
            if db.account_by_phone(&registration.phone).is_some() {
                return Err(StoreError::Conflict(format!(
                    "Phone {} is already registered",
                    registration.phone
                )));
            }
            let account = Account {
                id: new_record_id(),
                phone: registration.phone,
                name: registration.name,
                password: registration.password,
                role: registration.role,
                bound_phones: Vec::new(),
                avatar_url: None,
                voice_sample_url: None,
                did_voice_id: None,
                did_image_url: None,
            };
            db.users.push(account.clone());
            Ok(account)
        })
        .await?;

    info!(user_id = %account.id, role = %account.role, "Registered new account.");
    Ok(AccountView::from(&account))
}

pub async fn update_profile(
    store: &Store,
    id: &str,
    update: ProfileUpdate,
) -> Result<AccountView, StoreError> {
    if let Some(name) = &update.name {
        require(name, "name")?;
    }
    if let Some(password) = &update.password {
        require(password, "password")?;
    }

    let id = id.to_string();
    store
        .transaction(move |db| {
            let account = db
                .account_mut(&id)
                .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;
            if let Some(name) = update.name {
                account.name = name;
            }
            if let Some(password) = update.password {
                account.password = password;
            }
            if let Some(avatar_url) = update.avatar_url {
                account.avatar_url = Some(avatar_url);
            }
            Ok(AccountView::from(&*account))
        })
        .await
}

/// Looks up the accounts registered under any of `phones`, in store order.
pub async fn accounts_by_phones(
    store: &Store,
    phones: &[String],
) -> Result<Vec<AccountSummary>, StoreError> {
    let db = store.snapshot().await?;
    Ok(db
        .users
        .iter()
        .filter(|u| phones.contains(&u.phone))
        .map(|u| AccountSummary {
            phone: u.phone.clone(),
            name: u.name.clone(),
            role: u.role,
        })
        .collect())
}

/// Points the account's avatar image at an uploaded file.
pub async fn set_avatar_image(
    store: &Store,
    id: &str,
    url: &str,
) -> Result<AccountView, StoreError> {
    let (id, url) = (id.to_string(), url.to_string());
    store
        .transaction(move |db| {
            let account = db
                .account_mut(&id)
                .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;
            account.did_image_url = Some(url);
            Ok(AccountView::from(&*account))
        })
        .await
}

/// Records an uploaded voice sample and assigns a fresh voice id.
pub async fn set_voice_sample(
    store: &Store,
    id: &str,
    url: &str,
) -> Result<AccountView, StoreError> {
    let (id, url) = (id.to_string(), url.to_string());
    store
        .transaction(move |db| {
            let account = db
                .account_mut(&id)
                .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;
            account.did_voice_id = Some(format!(
                "voice-{}-{}",
                account.id,
                Utc::now().timestamp_millis()
            ));
            account.voice_sample_url = Some(url);
            Ok(AccountView::from(&*account))
        })
        .await
}
