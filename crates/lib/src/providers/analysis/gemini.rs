use crate::{
    errors::AnalysisError, providers::analysis::EmotionAnalyzer, types::EmotionScores,
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// The instruction sent alongside the audio.
pub const EMOTION_ANALYSIS_PROMPT: &str = "Listen to this recording of a family member talking with a care assistant. Score the speaker's happiness, sadness, anger and fear from 0 to 100 and describe their mood.";

// --- Gemini-specific request and response structures ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ContentResponse,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    #[serde(default)]
    text: Option<String>,
}

/// The structured answer requested from the model. Only `scores` feeds the
/// aggregation; the text fields are logged.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ModelAnalysis {
    #[serde(default)]
    pub overall_mood: Option<String>,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    pub scores: EmotionScores,
    #[serde(default)]
    pub suggestions: Option<String>,
}

/// The response schema: mood label, trend, summary, four-axis scores, suggestions.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "overallMood": { "type": "STRING" },
            "trend": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "scores": {
                "type": "OBJECT",
                "properties": {
                    "happiness": { "type": "NUMBER" },
                    "sadness": { "type": "NUMBER" },
                    "anger": { "type": "NUMBER" },
                    "fear": { "type": "NUMBER" }
                },
                "required": ["happiness", "sadness", "anger", "fear"]
            },
            "suggestions": { "type": "STRING" }
        },
        "required": ["overallMood", "scores"]
    })
}

// --- Gemini Analyzer implementation ---

/// Sends the audio inline to a Gemini `generateContent` endpoint.
#[derive(Clone, Debug)]
pub struct GeminiEmotionAnalyzer {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
}

impl GeminiEmotionAnalyzer {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(AnalysisError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    /// The default endpoint URL for `model_name`.
    pub fn default_url(model_name: &str) -> String {
        format!("https://generativelanguage.googleapis.com/v1beta/models/{model_name}:generateContent")
    }
}

#[async_trait]
impl EmotionAnalyzer for GeminiEmotionAnalyzer {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze(&self, audio: &Path) -> Result<EmotionScores, AnalysisError> {
        let bytes = tokio::fs::read(audio).await?;
        let request_body = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData(InlineData {
                        mime_type: "audio/wav".to_string(),
                        data: general_purpose::STANDARD.encode(&bytes),
                    }),
                    Part::Text(EMOTION_ANALYSIS_PROMPT.to_string()),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(AnalysisError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Deserialization(e.to_string()))?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.iter().find_map(|p| p.text.clone()))
            .ok_or(AnalysisError::MissingScores)?;

        let analysis: ModelAnalysis = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::Deserialization(e.to_string()))?;
        debug!(
            mood = analysis.overall_mood.as_deref().unwrap_or("-"),
            "Model analysis: {}",
            analysis.summary.as_deref().unwrap_or("")
        );
        Ok(analysis.scores)
    }
}
