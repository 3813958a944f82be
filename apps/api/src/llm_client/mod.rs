//! LLM Client — the single point of entry for text generation calls in Sarjan.
//!
//! ARCHITECTURAL RULE: No other module may call the generation endpoint directly.
//! Scoring and content generation depend on the `TextGenerator` trait only.
//!
//! One request per call. No retries, no streaming, no client-side timeout other
//! than the caller-supplied deadline.
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

pub mod prompts;
pub mod repair;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model service error (status {status}): {body}")]
    ModelService { status: u16, body: String },

    #[error("response envelope could not be decoded: {0}")]
    EnvelopeDecode(String),

    #[error("model output could not be repaired into JSON: {0}")]
    UnrepairableOutput(String),

    #[error("model output does not match the expected shape: {0}")]
    SchemaMismatch(String),

    #[error("model call cancelled before completion")]
    Cancelled,
}

/// Per-call generation settings.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub model: String,
    /// `None` leaves the model's own default in place.
    pub temperature: Option<f32>,
    /// The in-flight call is dropped and `LlmError::Cancelled` returned once this passes.
    pub deadline: Option<Instant>,
}

impl GenerationOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            deadline: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Anything that turns a prompt into raw completion text.
///
/// The returned text is NOT assumed to be valid JSON; callers run it through `repair`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// Client for an Ollama-compatible `/api/generate` endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            model: &options.model,
            prompt,
            temperature: options.temperature,
            stream: false,
        };

        debug!(
            "Sending generation request to {} (model: {}, prompt: {} chars)",
            self.endpoint,
            options.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::ModelService {
                status: status.as_u16(),
                body,
            });
        }

        let completion = extract_completion(&body)?;
        debug!("Generation succeeded: {} chars of completion", completion.len());
        Ok(completion)
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        match options.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, self.send(prompt, options))
                .await
                .map_err(|_| LlmError::Cancelled)?,
            None => self.send(prompt, options).await,
        }
    }
}

/// Pulls the completion text out of the response envelope.
/// `completion` wins over `response` when both are present.
fn extract_completion(body: &str) -> Result<String, LlmError> {
    let envelope: Value =
        serde_json::from_str(body).map_err(|e| LlmError::EnvelopeDecode(e.to_string()))?;

    ["completion", "response"]
        .iter()
        .find_map(|key| envelope.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| {
            LlmError::EnvelopeDecode(
                "neither 'completion' nor 'response' holds a string".to_string(),
            )
        })
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process fakes shared by the scorer, generator and pipeline tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned completions in order and records every prompt it saw.
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn complete(
            &self,
            prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::EnvelopeDecode("no scripted reply".to_string())))
        }
    }

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub async fn spawn_fake(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::{http::StatusCode, routing::post, Json, Router};

    use super::testing::spawn_fake;
    use super::*;

    fn options() -> GenerationOptions {
        GenerationOptions::new("llama3")
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/");
        assert_eq!(client.endpoint(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_request_body_omits_missing_temperature() {
        let body = GenerateRequest {
            model: "llama3",
            prompt: "hi",
            temperature: None,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"model": "llama3", "prompt": "hi", "stream": false}));
    }

    #[test]
    fn test_extract_completion_prefers_completion_field() {
        let body = r#"{"completion": "first", "response": "second"}"#;
        assert_eq!(extract_completion(body).unwrap(), "first");
    }

    #[test]
    fn test_extract_completion_falls_back_to_response() {
        let body = r#"{"model": "llama3", "response": "text", "done": true}"#;
        assert_eq!(extract_completion(body).unwrap(), "text");
    }

    #[test]
    fn test_extract_completion_rejects_missing_fields() {
        let err = extract_completion(r#"{"done": true}"#).unwrap_err();
        assert!(matches!(err, LlmError::EnvelopeDecode(_)));
    }

    #[test]
    fn test_extract_completion_rejects_non_json() {
        let err = extract_completion("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, LlmError::EnvelopeDecode(_)));
    }

    #[tokio::test]
    async fn test_server_error_surfaces_status_and_body() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model exploded") }),
        );
        let client = OllamaClient::new(&spawn_fake(router).await);

        let err = client.complete("prompt", &options()).await.unwrap_err();
        match err {
            LlmError::ModelService { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model exploded");
            }
            other => panic!("expected ModelService, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sends_expected_payload_and_returns_raw_text() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let router = Router::new().route(
            "/api/generate",
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(serde_json::json!({
                        "response": "```json\n{\"linkedin_posts\":[\"x\"]}\n```"
                    }))
                }
            }),
        );
        let client = OllamaClient::new(&spawn_fake(router).await);

        let text = client
            .complete("write things", &options().with_temperature(0.7))
            .await
            .unwrap();
        assert_eq!(text, "```json\n{\"linkedin_posts\":[\"x\"]}\n```");

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["prompt"], "write things");
        assert_eq!(body["stream"], false);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_deadline_cancels_in_flight_call() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Json(serde_json::json!({"response": "too late"}))
            }),
        );
        let client = OllamaClient::new(&spawn_fake(router).await);
        let deadline = Instant::now() + Duration::from_millis(100);

        let err = client
            .complete("prompt", &options().with_deadline(Some(deadline)))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Cancelled));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_failure() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OllamaClient::new(&format!("http://{addr}"));
        let err = client.complete("prompt", &options()).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }
}
