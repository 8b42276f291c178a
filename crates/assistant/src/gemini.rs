use crate::{
    refine_prompt, AnnotationAssistant, AssistantConfig, AssistantError, DESCRIBE_FRAME_PROMPT,
};
use async_trait::async_trait;
use media_io::EncodedImage;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Google Gemini `generateContent` backend.
pub struct GeminiAssistant {
    config: AssistantConfig,
    client: reqwest::Client,
}

impl GeminiAssistant {
    /// An empty key is accepted here; each request then fails with
    /// [`AssistantError::MissingCredential`].
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model.trim()
        )
    }

    async fn generate(&self, model: &str, parts: Vec<Value>) -> Result<String, AssistantError> {
        if !self.config.has_credential() {
            return Err(AssistantError::MissingCredential);
        }
        let payload = json!({
            "contents": [{ "role": "user", "parts": parts }]
        });
        debug!("gemini request to {model}");
        let response = self
            .client
            .post(self.endpoint(model))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("X-Goog-Api-Key", self.config.api_key.trim())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|err| {
            AssistantError::InvalidResponse(format!("Invalid Gemini response JSON: {err}"))
        })?;
        Ok(parsed.text())
    }
}

#[async_trait]
impl AnnotationAssistant for GeminiAssistant {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze_frame(&self, image: &EncodedImage) -> Result<String, AssistantError> {
        let parts = vec![
            json!({
                "inlineData": { "mimeType": image.mime_type, "data": image.data }
            }),
            json!({ "text": DESCRIBE_FRAME_PROMPT }),
        ];
        let text = self.generate(&self.config.vision_model, parts).await?;
        Ok(text.trim().to_string())
    }

    async fn refine_note_text(&self, text: &str) -> Result<String, AssistantError> {
        let parts = vec![json!({ "text": refine_prompt(text) })];
        let refined = self.generate(&self.config.text_model, parts).await?;
        let refined = refined.trim();
        if refined.is_empty() {
            Ok(text.to_string())
        } else {
            Ok(refined.to_string())
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

impl GeminiResponse {
    /// Text parts of the first candidate, concatenated
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GeminiResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let body = r#"{"candidates":[
            {"content":{"role":"model","parts":[{"text":"A dog "},{"text":"runs."}]}},
            {"content":{"parts":[{"text":"ignored"}]}}
        ]}"#;
        assert_eq!(parse(body).text(), "A dog runs.");
    }

    #[test]
    fn missing_candidates_or_parts_yield_empty_text() {
        assert_eq!(parse("{}").text(), "");
        assert_eq!(parse(r#"{"candidates":[{}]}"#).text(), "");
        assert_eq!(
            parse(r#"{"candidates":[{"content":{"parts":[{"inlineData":{}}]}}]}"#).text(),
            ""
        );
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let assistant = GeminiAssistant::new(AssistantConfig {
            api_base: "http://localhost:9000/".into(),
            ..Default::default()
        });
        assert_eq!(
            assistant.endpoint("gemini-x"),
            "http://localhost:9000/v1beta/models/gemini-x:generateContent"
        );
    }

    #[tokio::test]
    async fn requests_without_key_fail_before_sending() {
        let assistant = GeminiAssistant::new(AssistantConfig {
            api_base: "http://127.0.0.1:9".into(),
            ..Default::default()
        });
        let err = assistant.refine_note_text("note").await.unwrap_err();
        assert!(matches!(err, AssistantError::MissingCredential));

        let image = EncodedImage::from_bytes("image/jpeg", &[1, 2, 3]);
        let err = assistant.analyze_frame(&image).await.unwrap_err();
        assert!(matches!(err, AssistantError::MissingCredential));
    }
}
