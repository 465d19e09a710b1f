use thiserror::Error;

/// Errors raised by the storage layer and the record operations built on it.
///
/// The request-facing variants (`Validation`, `NotFound`, `Unauthorized`,
/// `Conflict`) carry a message meant for the caller. `Io` and `Json` are
/// infrastructure failures and abort the current request or run.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access the data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("The data file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
}

/// Errors from reading or writing the pending-artifact manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to access the manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("The manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from writing an uploaded file into the uploads tree.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to write the uploaded file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("A user id is required for analysis uploads")]
    MissingUserId,
    #[error("Invalid user id '{0}': only letters, digits and '_' are allowed")]
    InvalidUserId(String),
}

/// Errors from the external transcoding step.
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("Failed to launch the transcoder: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("The transcoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("The transcoder did not finish within {0} seconds")]
    Timeout(u64),
}

/// Errors from an emotion-analysis backend.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to build HTTP client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to read the artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("Request to the analysis service failed: {0}")]
    Request(reqwest::Error),
    #[error("The analysis service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Failed to deserialize the analysis response: {0}")]
    Deserialization(String),
    #[error("The analysis response did not contain any emotion scores")]
    MissingScores,
}

/// Errors that abort a whole aggregation run.
///
/// Per-artifact failures never surface here; they only reduce the number of
/// valid samples for the affected user.
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("An aggregation run is already in progress")]
    AlreadyRunning,
    #[error("Failed to read the pending artifacts: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from driving an avatar conversation session.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot apply '{event}' while the session is {state}")]
    InvalidTransition { state: String, event: String },
    #[error("The session is not connected (current state: {0})")]
    NotConnected(String),
}
