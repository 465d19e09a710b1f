use anyhow::Result;
use async_trait::async_trait;
use familycare::{
    artifacts::PendingArea,
    errors::{AnalysisError, StoreError, TranscodeError},
    providers::analysis::EmotionAnalyzer,
    store::{MemoryStorage, Storage, Store},
    transcode::Transcoder,
    types::{Account, Database, EmotionScores, Role},
};
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tempfile::TempDir;

// --- Test Workspace ---

/// An isolated uploads tree and data file inside a temporary directory.
pub struct TestWorkspace {
    pub dir: TempDir,
    pub store: Arc<Store>,
    pub pending: Arc<PendingArea>,
}

impl TestWorkspace {
    /// Creates the directories and an empty JSON-file store.
    pub async fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let store = Arc::new(Store::json_file(dir.path().join("db.json")));
        let pending = Arc::new(PendingArea::new(dir.path().join("uploads")));
        pending.ensure_dirs().await?;
        Ok(Self {
            dir,
            store,
            pending,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("db.json")
    }

    pub fn uploads_dir(&self) -> &Path {
        self.pending.public_dir()
    }

    /// Drops a file straight into the holding area, bypassing the manifest.
    pub async fn write_pending(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.pending.dir().join(name);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Persists an account and returns it.
    pub async fn seed_account(&self, account: Account) -> Result<Account> {
        let stored = account.clone();
        self.store
            .transaction(move |db: &mut Database| {
                db.users.push(account);
                Ok(())
            })
            .await?;
        Ok(stored)
    }
}

/// An account with the given id and phone; password is "secret".
pub fn account(id: &str, phone: &str, name: &str, role: Role) -> Account {
    Account {
        id: id.to_string(),
        phone: phone.to_string(),
        name: name.to_string(),
        password: "secret".to_string(),
        role,
        bound_phones: Vec::new(),
        avatar_url: None,
        voice_sample_url: None,
        did_voice_id: None,
        did_image_url: None,
    }
}

// --- Storage ---

/// An in-memory backend whose saves start failing after `allowed_saves` succeed.
#[derive(Clone, Debug)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    remaining: Arc<AtomicUsize>,
}

impl FlakyStorage {
    pub fn new(db: Database, allowed_saves: usize) -> Self {
        Self {
            inner: MemoryStorage::new(db),
            remaining: Arc::new(AtomicUsize::new(allowed_saves)),
        }
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn load(&self) -> Result<Database, StoreError> {
        self.inner.load().await
    }

    async fn save(&self, db: &Database) -> Result<(), StoreError> {
        let allowed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !allowed {
            return Err(StoreError::Io(std::io::Error::other("No space left on device")));
        }
        self.inner.save(db).await
    }
}

// --- Mock Analyzer ---

/// An analyzer that replays queued results and records which files it saw.
///
/// Results are consumed in the order they were queued. Once the queue is
/// empty every call fails with `MissingScores`.
#[derive(Clone, Debug, Default)]
pub struct MockAnalyzer {
    responses: Arc<Mutex<Vec<Option<EmotionScores>>>>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful analysis.
    pub fn push_scores(&self, scores: EmotionScores) -> &Self {
        self.responses.lock().unwrap().insert(0, Some(scores));
        self
    }

    /// Queues a failed analysis.
    pub fn push_failure(&self) -> &Self {
        self.responses.lock().unwrap().insert(0, None);
        self
    }

    pub fn get_calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmotionAnalyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, audio: &Path) -> Result<EmotionScores, AnalysisError> {
        self.calls.lock().unwrap().push(audio.to_path_buf());
        match self.responses.lock().unwrap().pop() {
            Some(Some(scores)) => Ok(scores),
            Some(None) => Err(AnalysisError::Api {
                status: 500,
                body: "mock failure".to_string(),
            }),
            None => Err(AnalysisError::MissingScores),
        }
    }
}

// --- Transcoders ---

/// Copies the input to the output unchanged.
#[derive(Clone, Debug, Default)]
pub struct CopyTranscoder;

#[async_trait]
impl Transcoder for CopyTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

/// Writes a partial output and then fails, like a crashed `ffmpeg`.
#[derive(Clone, Debug, Default)]
pub struct FailingTranscoder;

#[async_trait]
impl Transcoder for FailingTranscoder {
    async fn transcode(&self, _input: &Path, output: &Path) -> Result<(), TranscodeError> {
        tokio::fs::write(output, b"partial").await?;
        Err(TranscodeError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "Invalid data found when processing input".to_string(),
        })
    }
}
