//! # Shared Constants
//!
//! Names and defaults shared by the library and the server, kept in one place
//! so the upload router, the aggregator and the HTTP layer agree on them.

/// The default path of the JSON data file.
pub const DEFAULT_DB_FILE: &str = "db.json";

/// The default root of the uploads tree. Public files live directly in it.
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// The holding area for artifacts waiting for sentiment analysis,
/// relative to the uploads root.
pub const PENDING_DIR_NAME: &str = "pending_analysis";

/// The side-channel manifest inside the holding area.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// The URL prefix under which the public uploads directory is served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Filename prefixes of artifacts the aggregator picks up.
pub const ARTIFACT_PREFIXES: [&str; 2] = ["video-", "audio-"];

/// Extension appended to an artifact name for its temporary transcoded copy.
pub const TRANSCODED_SUFFIX: &str = ".transcoded.wav";

/// Upper bound (exclusive) of the random component in generated filenames.
pub const FILENAME_RANDOM_BOUND: u32 = 1_000_000_000;
