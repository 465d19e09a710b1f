pub mod endpoint;
pub mod gemini;

use crate::{errors::AnalysisError, types::EmotionScores};
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use endpoint::HttpEmotionAnalyzer;
pub use gemini::GeminiEmotionAnalyzer;
use std::fmt::Debug;
use std::path::Path;

/// A trait for scoring the emotional content of a recorded sample.
///
/// Implementations receive the transcoded WAV file and return the four-axis
/// score vector. They make exactly one attempt per call.
#[async_trait]
pub trait EmotionAnalyzer: Send + Sync + Debug + DynClone {
    /// Returns the name of the backend (e.g., "endpoint", "gemini").
    fn name(&self) -> &str;

    /// Scores the audio file at `audio`.
    async fn analyze(&self, audio: &Path) -> Result<EmotionScores, AnalysisError>;
}

dyn_clone::clone_trait_object!(EmotionAnalyzer);
