//! # Transcoding
//!
//! Artifacts are normalized to mono PCM WAV at a fixed sample rate before
//! analysis. The default implementation shells out to `ffmpeg`.

use crate::errors::TranscodeError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::ffi::OsString;
use std::fmt::Debug;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Converts one media file into the canonical analysis format.
#[async_trait]
pub trait Transcoder: Send + Sync + Debug + DynClone {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}

dyn_clone::clone_trait_object!(Transcoder);

/// Runs an external `ffmpeg`-compatible program.
#[derive(Clone, Debug)]
pub struct FfmpegTranscoder {
    program: String,
    sample_rate: u32,
    channels: u32,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(
        program: impl Into<String>,
        sample_rate: u32,
        channels: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            sample_rate,
            channels,
            timeout,
        }
    }

    /// The argument list: `-i <input> -ar <rate> -ac <channels> -y <output>`.
    pub fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-i".into(),
            input.as_os_str().to_owned(),
            "-ar".into(),
            self.sample_rate.to_string().into(),
            "-ac".into(),
            self.channels.to_string().into(),
            "-y".into(),
            output.as_os_str().to_owned(),
        ]
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg", 16_000, 1, Duration::from_secs(120))
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        debug!("Transcoding {} -> {}", input.display(), output.display());
        let child = Command::new(&self.program)
            .args(self.args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| TranscodeError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // ffmpeg prints its banner first; the cause is at the end.
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            return Err(TranscodeError::Failed {
                status: output.status.to_string(),
                stderr: tail.into_iter().rev().collect::<Vec<_>>().join("\n"),
            });
        }
        Ok(())
    }
}
