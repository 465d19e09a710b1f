//! # Analyzer Factory
//!
//! Builds the configured emotion-analysis backend. Keeping this in the
//! library lets the server and tests share the same construction rules.

use crate::providers::analysis::{EmotionAnalyzer, GeminiEmotionAnalyzer, HttpEmotionAnalyzer};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// Settings for the analysis backend, as found under `analysis:` in `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AnalyzerSettings {
    /// `endpoint` for a dedicated analysis service, `gemini` for the multimodal model.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "endpoint".to_string()
}

fn default_model_name() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: None,
            api_key: None,
            model_name: default_model_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// The analysis service URL used when none is configured.
pub const DEFAULT_EMOTION_API_URL: &str = "http://localhost:8000/analyze";

pub fn create_analyzer(
    settings: &AnalyzerSettings,
) -> Result<Box<dyn EmotionAnalyzer>, anyhow::Error> {
    let timeout = Duration::from_secs(settings.timeout_secs);
    let analyzer: Box<dyn EmotionAnalyzer> = match settings.provider.as_str() {
        "endpoint" => {
            let api_url = settings
                .api_url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_EMOTION_API_URL.to_string());
            info!("Using emotion analysis endpoint at {api_url}");
            Box::new(HttpEmotionAnalyzer::new(api_url, timeout)?)
        }
        "gemini" => {
            let api_key = settings
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    anyhow::anyhow!("api_key is required for the gemini analysis provider")
                })?;
            let api_url = settings
                .api_url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| GeminiEmotionAnalyzer::default_url(&settings.model_name));
            info!("Using Gemini model '{}' for emotion analysis", settings.model_name);
            Box::new(GeminiEmotionAnalyzer::new(api_url, api_key, timeout)?)
        }
        other => return Err(anyhow::anyhow!("Unsupported analysis provider '{other}'")),
    };
    Ok(analyzer)
}
