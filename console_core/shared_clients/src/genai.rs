//! Client for the hosted generative-language service (Gemini REST API).
//!
//! The service is treated as a best-effort oracle: callers get a `Result`
//! and decide their own fallback text. Nothing here retries.

use async_trait::async_trait;
use common::config::components::genai::GenAiConfig;
use common::error::diagnostics::DiagnosticMessage;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("missing API key: {context}")]
    MissingApiKey { context: DiagnosticMessage },
    #[error("request failed: {context}")]
    Request {
        context: DiagnosticMessage,
        #[source]
        source: reqwest::Error,
    },
    #[error("service error ({status}): {context}")]
    Api {
        status: StatusCode,
        context: DiagnosticMessage,
    },
    #[error("invalid response: {context}")]
    InvalidResponse { context: DiagnosticMessage },
}

impl GenAiError {
    #[track_caller]
    pub fn missing_api_key() -> Self {
        Self::MissingApiKey {
            context: DiagnosticMessage::new(
                "set genai.api_key or the GEMINI_API_KEY environment variable",
            ),
        }
    }

    #[track_caller]
    pub fn api(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            context: DiagnosticMessage::new(message.into()),
        }
    }
}

impl From<reqwest::Error> for GenAiError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        GenAiError::Request {
            context: DiagnosticMessage::new(err.to_string()),
            source: err,
        }
    }
}

/// Which configured model a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Fast,
    Reasoning,
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Free-text completion. An empty string means the service answered
    /// without any text.
    async fn generate_text(&self, tier: ModelTier, prompt: &str) -> Result<String, GenAiError>;

    /// Completion constrained to `schema`, parsed as JSON.
    async fn generate_json(
        &self,
        tier: ModelTier,
        prompt: &str,
        schema: Value,
    ) -> Result<Value, GenAiError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Value>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GenerateResponse {
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    fast_model: String,
    reasoning_model: String,
}

impl GeminiClient {
    pub fn new(config: &GenAiConfig) -> Result<Self, GenAiError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            fast_model: config.fast_model.clone(),
            reasoning_model: config.reasoning_model.clone(),
        })
    }

    fn model(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast_model,
            ModelTier::Reasoning => &self.reasoning_model,
        }
    }

    async fn generate(
        &self,
        tier: ModelTier,
        prompt: &str,
        generation_config: Option<Value>,
    ) -> Result<String, GenAiError> {
        let api_key = self.api_key.as_deref().ok_or_else(GenAiError::missing_api_key)?;
        let model = self.model(tier);
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config,
        };

        log::debug!("sending generateContent request to model {model}");
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("generateContent returned status {status}"),
            };
            return Err(GenAiError::api(status, message));
        }

        let parsed: GenerateResponse = resp.json().await?;
        Ok(parsed.text())
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_text(&self, tier: ModelTier, prompt: &str) -> Result<String, GenAiError> {
        self.generate(tier, prompt, None).await
    }

    async fn generate_json(
        &self,
        tier: ModelTier,
        prompt: &str,
        schema: Value,
    ) -> Result<Value, GenAiError> {
        let config = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        });
        let text = self.generate(tier, prompt, Some(config)).await?;
        serde_json::from_str(&text)
            .map_err(|e| GenAiError::invalid_response(format!("response was not JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> GeminiClient {
        let config = GenAiConfig {
            base_url: server.uri(),
            api_key: api_key.map(str::to_string),
            fast_model: "flash".into(),
            reasoning_model: "pro".into(),
            timeout_secs: Some(5),
        };
        GeminiClient::new(&config).expect("client")
    }

    fn text_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }

    #[tokio::test]
    async fn text_generation_uses_tier_model_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/pro:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "analyse this" }] }]
            })))
            .respond_with(text_response("- looks fine"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let text = client
            .generate_text(ModelTier::Reasoning, "analyse this")
            .await
            .expect("text");
        assert_eq!(text, "- looks fine");
    }

    #[tokio::test]
    async fn json_generation_sends_schema_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/flash:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(text_response(r#"[{"id": "a", "value": 1}]"#))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let value = client
            .generate_json(ModelTier::Fast, "rows please", json!({"type": "ARRAY"}))
            .await
            .expect("json");
        assert_eq!(value, json!([{"id": "a", "value": 1}]));
    }

    #[tokio::test]
    async fn service_errors_carry_upstream_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "API key not valid." }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("bad"));
        let err = client
            .generate_text(ModelTier::Fast, "hi")
            .await
            .expect_err("should fail");
        match err {
            GenAiError::Api { status, context } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(context.message(), "API key not valid.");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(text_response("never"))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client
            .generate_text(ModelTier::Fast, "hi")
            .await
            .expect_err("no key");
        assert_matches!(err, GenAiError::MissingApiKey { .. });
    }

    #[tokio::test]
    async fn empty_candidates_yield_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k"));
        let text = client
            .generate_text(ModelTier::Fast, "hi")
            .await
            .expect("ok");
        assert!(text.is_empty());
    }
}
