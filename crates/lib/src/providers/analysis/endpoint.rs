use crate::{errors::AnalysisError, providers::analysis::EmotionAnalyzer, types::EmotionScores};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client as ReqwestClient,
};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Posts the WAV as a multipart `file` part to a dedicated emotion-analysis service.
#[derive(Clone, Debug)]
pub struct HttpEmotionAnalyzer {
    client: ReqwestClient,
    api_url: String,
}

impl HttpEmotionAnalyzer {
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(AnalysisError::ReqwestClientBuild)?;
        Ok(Self { client, api_url })
    }
}

/// Reads the scores out of a service response.
///
/// The service answers either `{"success": true, "scores": {...}}` or a bare
/// score object. Missing or non-numeric axes count as zero. A body flagged
/// `"success": false` is never a sample, whatever else it carries.
pub fn parse_scores(body: &Value) -> Result<EmotionScores, AnalysisError> {
    let Some(object) = body.as_object() else {
        return Err(AnalysisError::Deserialization(format!(
            "expected a JSON object, got {body}"
        )));
    };
    let scores = match object.get("scores") {
        Some(Value::Object(scores)) => scores,
        _ => object,
    };
    let axis = |name: &str| scores.get(name).and_then(Value::as_f64);
    let has_any_axis = ["happiness", "sadness", "anger", "fear"]
        .iter()
        .any(|name| axis(name).is_some());
    let success = object.get("success").and_then(Value::as_bool);
    if success == Some(false) || (!has_any_axis && success != Some(true)) {
        return Err(AnalysisError::MissingScores);
    }
    Ok(EmotionScores::new(
        axis("happiness").unwrap_or(0.0),
        axis("sadness").unwrap_or(0.0),
        axis("anger").unwrap_or(0.0),
        axis("fear").unwrap_or(0.0),
    ))
}

#[async_trait]
impl EmotionAnalyzer for HttpEmotionAnalyzer {
    fn name(&self) -> &str {
        "endpoint"
    }

    async fn analyze(&self, audio: &Path) -> Result<EmotionScores, AnalysisError> {
        let bytes = tokio::fs::read(audio).await?;
        let file_name = audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("sample.wav")
            .to_string();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(AnalysisError::Request)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.api_url)
            .multipart(form)
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

        let body: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::Deserialization(e.to_string()))?;
        debug!("Analysis service answered: {body}");
        parse_scores(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_nested_scores() {
        let scores = parse_scores(&json!({"success": true, "scores": {"happiness": 80, "fear": 3}}))
            .unwrap();
        assert_eq!(scores, EmotionScores::new(80.0, 0.0, 0.0, 3.0));
    }

    #[test]
    fn reads_bare_scores() {
        let scores = parse_scores(&json!({"sadness": 12.5})).unwrap();
        assert_eq!(scores.sadness, 12.5);
    }

    #[test]
    fn rejects_bodies_without_scores() {
        assert!(matches!(
            parse_scores(&json!({"error": "bad audio"})),
            Err(AnalysisError::MissingScores)
        ));
        assert!(parse_scores(&json!([1, 2])).is_err());
    }

    #[test]
    fn rejects_unsuccessful_bodies_even_with_scores() {
        assert!(matches!(
            parse_scores(&json!({"success": false, "happiness": 80})),
            Err(AnalysisError::MissingScores)
        ));
        assert!(matches!(
            parse_scores(&json!({"success": false, "scores": {"sadness": 40}})),
            Err(AnalysisError::MissingScores)
        ));
    }
}
