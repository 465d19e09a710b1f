//! # Upload Router
//!
//! Writes uploaded files into the uploads tree. The multipart field name
//! decides where a file goes: `video` and `audio` are analysis artifacts and
//! land in the holding area, everything else (avatar images, voice samples)
//! is public and served under `/uploads`.

use crate::{
    artifacts::{ManifestEntry, PendingArea},
    constants::{FILENAME_RANDOM_BOUND, UPLOADS_URL_PREFIX},
    errors::UploadError,
};
use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

/// Where an upload belongs, derived from its multipart field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// A dialogue recording queued for sentiment analysis.
    Artifact,
    /// An avatar image sample.
    Image,
    /// A voice sample.
    Voice,
    /// Any other public file.
    Asset,
}

impl UploadKind {
    pub fn from_field(field: &str) -> Self {
        match field {
            "video" | "audio" => UploadKind::Artifact,
            "image" => UploadKind::Image,
            "voice" => UploadKind::Voice,
            _ => UploadKind::Asset,
        }
    }
}

/// The extension used when the client sent a filename without one.
fn fallback_extension(field: &str) -> &'static str {
    match field {
        "video" | "audio" => ".webm",
        "image" => ".png",
        "voice" => ".wav",
        _ => "",
    }
}

/// The extension of `original_name` including the dot, if it has one.
fn extension_of(original_name: Option<&str>) -> Option<String> {
    let ext = Path::new(original_name?).extension()?.to_str()?;
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{ext}"))
}

/// Builds a collision-resistant name from the field, the current time and a random number.
///
/// Artifacts carry the owner's id as the second segment so they can still be
/// attributed if the manifest is lost.
pub fn generate_file_name(
    field: &str,
    user_id: Option<&str>,
    original_name: Option<&str>,
) -> String {
    let millis = Utc::now().timestamp_millis();
    let random: u32 = rand::thread_rng().gen_range(0..FILENAME_RANDOM_BOUND);
    let ext = extension_of(original_name).unwrap_or_else(|| fallback_extension(field).to_string());
    match user_id {
        Some(user_id) => format!("{field}-{user_id}-{millis}-{random}{ext}"),
        None => format!("{field}-{millis}-{random}{ext}"),
    }
}

/// Whether `user_id` can be embedded in an artifact filename.
pub fn is_valid_user_id(user_id: &str) -> bool {
    !user_id.is_empty() && user_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A file written by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub kind: UploadKind,
    pub file_name: String,
    pub path: PathBuf,
    /// Relative URL of the file once it is public.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadRouter {
    pending: Arc<PendingArea>,
}

impl UploadRouter {
    pub fn new(pending: Arc<PendingArea>) -> Self {
        Self { pending }
    }

    /// Writes `bytes` under a generated name and returns where it went.
    ///
    /// Artifacts require the owner's account id. It is embedded in the
    /// filename, so only ASCII letters, digits and `_` are accepted.
    pub async fn store(
        &self,
        field: &str,
        original_name: Option<&str>,
        user_id: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        let kind = UploadKind::from_field(field);
        let (dir, user_id) = match kind {
            UploadKind::Artifact => {
                let user_id = user_id.ok_or(UploadError::MissingUserId)?;
                if !is_valid_user_id(user_id) {
                    return Err(UploadError::InvalidUserId(user_id.to_string()));
                }
                (self.pending.dir(), Some(user_id))
            }
            _ => (self.pending.public_dir(), None),
        };

        fs::create_dir_all(dir).await?;
        let file_name = generate_file_name(field, user_id, original_name);
        let path = dir.join(&file_name);
        fs::write(&path, bytes).await?;

        if let (UploadKind::Artifact, Some(user_id)) = (kind, user_id) {
            let entry = ManifestEntry {
                artifact_id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                kind: field.to_string(),
                queued_at: Utc::now(),
            };
            if let Err(e) = self.pending.register(&file_name, entry).await {
                let _ = fs::remove_file(&path).await;
                return Err(e.into());
            }
        }

        info!(
            field,
            size = bytes.len(),
            "Stored upload {} as {:?}.",
            file_name,
            kind
        );
        Ok(StoredUpload {
            kind,
            url: format!("{UPLOADS_URL_PREFIX}/{file_name}"),
            file_name,
            path,
        })
    }

    /// Removes a stored public upload that turned out to be unusable.
    pub async fn discard(&self, upload: &StoredUpload) -> std::io::Result<()> {
        fs::remove_file(&upload.path).await
    }
}
