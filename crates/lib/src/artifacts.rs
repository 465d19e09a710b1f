//! # Pending Artifacts
//!
//! Recorded dialogue samples wait in the holding area until the aggregator
//! processes them. Each upload gets an entry in a side-channel manifest that
//! records which account it belongs to. Files without a manifest entry (for
//! example, dropped in by hand) are attributed by the filename convention
//! `<kind>-<userId>-<timestamp>-<random>.<ext>`.

use crate::{
    constants::{ARTIFACT_PREFIXES, MANIFEST_FILE_NAME, PENDING_DIR_NAME, TRANSCODED_SUFFIX},
    errors::ManifestError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::{debug, info, warn};

/// What the manifest knows about one pending artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub artifact_id: String,
    pub user_id: String,
    pub kind: String,
    pub queued_at: DateTime<Utc>,
}

/// The manifest document, keyed by artifact file name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub artifacts: BTreeMap<String, ManifestEntry>,
}

/// The artifacts of one account, in the order they are processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactGroup {
    pub user_id: String,
    pub files: Vec<String>,
}

/// Returns true for names the aggregator should pick up.
pub fn is_artifact_name(name: &str) -> bool {
    ARTIFACT_PREFIXES.iter().any(|p| name.starts_with(p)) && !name.ends_with(TRANSCODED_SUFFIX)
}

/// The user id embedded in an artifact name: the second `-`-separated segment.
pub fn user_id_from_file_name(name: &str) -> Option<&str> {
    name.split('-').nth(1).filter(|segment| !segment.is_empty())
}

/// Groups artifact names by owning account, sorted by user id and file name.
///
/// The manifest wins over the filename. Names that are not artifacts, or that
/// have neither a manifest entry nor a parsable user segment, are dropped.
pub fn group_by_user<I>(names: I, manifest: &Manifest) -> Vec<ArtifactGroup>
where
    I: IntoIterator<Item = String>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for name in names {
        if !is_artifact_name(&name) {
            continue;
        }
        let user_id = match manifest.artifacts.get(&name) {
            Some(entry) => entry.user_id.clone(),
            None => match user_id_from_file_name(&name) {
                Some(id) => id.to_string(),
                None => {
                    debug!("Skipping artifact with no user segment: {name}");
                    continue;
                }
            },
        };
        groups.entry(user_id).or_default().push(name);
    }
    groups
        .into_iter()
        .map(|(user_id, mut files)| {
            files.sort();
            ArtifactGroup { user_id, files }
        })
        .collect()
}

/// The holding area plus the public directory artifacts are released into.
#[derive(Debug)]
pub struct PendingArea {
    dir: PathBuf,
    public_dir: PathBuf,
    manifest_lock: Mutex<()>,
}

impl PendingArea {
    /// The holding area inside `uploads_dir`. Released artifacts go to `uploads_dir` itself.
    pub fn new(uploads_dir: impl AsRef<Path>) -> Self {
        let public_dir = uploads_dir.as_ref().to_path_buf();
        Self {
            dir: public_dir.join(PENDING_DIR_NAME),
            public_dir,
            manifest_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE_NAME)
    }

    /// Creates the public and holding directories if they are missing.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        fs::create_dir_all(&self.public_dir).await
    }

    async fn read_manifest(&self) -> Result<Manifest, ManifestError> {
        match fs::read_to_string(self.manifest_path()).await {
            Ok(content) if content.trim().is_empty() => Ok(Manifest::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Manifest::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_manifest(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        let body = serde_json::to_vec_pretty(manifest)?;
        fs::write(self.manifest_path(), body).await?;
        Ok(())
    }

    /// Returns the current manifest.
    pub async fn manifest(&self) -> Result<Manifest, ManifestError> {
        let _guard = self.manifest_lock.lock().await;
        self.read_manifest().await
    }

    /// Records the owner of a freshly written artifact.
    pub async fn register(
        &self,
        file_name: &str,
        entry: ManifestEntry,
    ) -> Result<(), ManifestError> {
        let _guard = self.manifest_lock.lock().await;
        let mut manifest = self.read_manifest().await?;
        manifest.artifacts.insert(file_name.to_string(), entry);
        self.write_manifest(&manifest).await
    }

    /// Lists the holding area and groups its artifacts by account.
    pub async fn scan(&self) -> Result<Vec<ArtifactGroup>, ManifestError> {
        let manifest = self.manifest().await?;
        let mut names = Vec::new();
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(group_by_user(names, &manifest))
    }

    /// Moves processed artifacts into the public directory and forgets them.
    pub async fn release(&self, files: &[String]) -> Result<(), ManifestError> {
        let _guard = self.manifest_lock.lock().await;
        let mut manifest = self.read_manifest().await?;
        for file in files {
            let from = self.dir.join(file);
            let to = self.public_dir.join(file);
            match fs::rename(&from, &to).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("Artifact {file} vanished before it could be released.");
                }
                Err(e) => return Err(e.into()),
            }
            manifest.artifacts.remove(file);
        }
        self.write_manifest(&manifest).await?;
        info!("Released {} artifact(s) to the public uploads.", files.len());
        Ok(())
    }
}
