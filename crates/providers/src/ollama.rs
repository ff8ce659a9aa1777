//! Ollama client — all interaction with the local inference server.
//!
//! Talks to the native Ollama API:
//! - `POST /api/chat` for completions (with `format: "json"` when the caller
//!   wants JSON-constrained sampling) and streaming NDJSON
//! - `POST /api/show` as the health probe (reachable AND model present)
//! - `GET /api/tags` for local model listing
//!
//! Transient transport failures are retried with exponential backoff
//! (3 attempts, 0.5 s base, doubling). HTTP error statuses are not transport
//! failures and are surfaced immediately; malformed model output is not an
//! error at all — the agent's parsing cascade handles it.

use async_trait::async_trait;
use futures::StreamExt;
use localclaw_config::OllamaConfig;
use localclaw_core::client::{LlmClient, ResponseFormat};
use localclaw_core::error::ClientError;
use localclaw_core::message::Message;
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Client for a locally hosted Ollama server.
pub struct OllamaClient {
    base_url: String,
    model: RwLock<String>,
    temperature: f32,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: RwLock::new(config.model.clone()),
            temperature: config.temperature,
            client,
        }
    }

    /// The currently configured model name.
    pub fn model(&self) -> String {
        self.model.read().expect("model lock poisoned").clone()
    }

    /// Hot-swap the model (settings reload) without rebuilding the client.
    pub fn set_model(&self, model: impl Into<String>) {
        *self.model.write().expect("model lock poisoned") = model.into();
    }

    fn to_api_messages(messages: &[Message]) -> Vec<serde_json::Value> {
        messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role.as_str(),
                    "content": m.content,
                })
            })
            .collect()
    }

    fn chat_body(
        &self,
        messages: &[Message],
        format: ResponseFormat,
        temperature: Option<f32>,
        stream: bool,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model(),
            "messages": Self::to_api_messages(messages),
            "stream": stream,
            "options": { "temperature": temperature.unwrap_or(self.temperature) },
        });
        if format == ResponseFormat::Json {
            body["format"] = serde_json::json!("json");
        }
        body
    }

    /// POST with bounded retry for transport failures only.
    async fn post_with_retry(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, ClientError> {
        let mut delay = BACKOFF_BASE;
        let mut last_error = String::new();

        for attempt in 1..=MAX_RETRIES {
            match self.client.post(url).json(body).send().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < MAX_RETRIES {
                        warn!(
                            attempt,
                            max = MAX_RETRIES,
                            wait_ms = delay.as_millis() as u64,
                            error = %last_error,
                            "Ollama call failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(ClientError::Unavailable {
            attempts: MAX_RETRIES,
            message: last_error,
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status().as_u16();
        if status == 404 {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::ModelNotFound(body));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Ollama returned error");
            return Err(ClientError::ApiError {
                status_code: status,
                message: body,
            });
        }
        Ok(response)
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    #[serde(alias = "name")]
    model: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn chat(
        &self,
        messages: &[Message],
        format: ResponseFormat,
        temperature: Option<f32>,
    ) -> Result<String, ClientError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.chat_body(messages, format, temperature, false);

        debug!(model = %self.model(), count = messages.len(), "Sending chat request");

        let response = self.post_with_retry(&url, &body).await?;
        let response = Self::check_status(response).await?;

        let parsed: ChatResponse = response.json().await.map_err(|e| ClientError::ApiError {
            status_code: 200,
            message: format!("Failed to parse response: {e}"),
        })?;

        Ok(parsed.message.content)
    }

    async fn chat_stream(
        &self,
        messages: &[Message],
        temperature: Option<f32>,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<String, ClientError>>, ClientError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.chat_body(messages, ResponseFormat::Text, temperature, true);

        let response = self.post_with_retry(&url, &body).await?;
        let response = Self::check_status(response).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ClientError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                // Ollama streams NDJSON: one JSON object per line.
                while let Some(newline) = buffer.find('\n') {
                    let line = buffer[..newline].trim().to_string();
                    buffer.drain(..=newline);
                    if line.is_empty() {
                        continue;
                    }

                    match serde_json::from_str::<StreamChunk>(&line) {
                        Ok(parsed) => {
                            if let Some(msg) = parsed.message
                                && !msg.content.is_empty()
                                && tx.send(Ok(msg.content)).await.is_err()
                            {
                                return;
                            }
                            if parsed.done {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Skipping unparseable stream line");
                        }
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/show", self.base_url);
        let body = serde_json::json!({ "model": self.model() });

        match self.client.post(&url).json(&body).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, ClientError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.model).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OllamaClient {
        OllamaClient::new(&OllamaConfig {
            base_url: "http://localhost:11434/".into(),
            model: "phi4-mini".into(),
            temperature: 0.7,
            context_window: 4096,
        })
    }

    #[test]
    fn base_url_trailing_slash_stripped() {
        let client = test_client();
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn model_hot_swap() {
        let client = test_client();
        assert_eq!(client.model(), "phi4-mini");
        client.set_model("qwen2.5:3b");
        assert_eq!(client.model(), "qwen2.5:3b");
    }

    #[test]
    fn chat_body_includes_json_format() {
        let client = test_client();
        let messages = vec![Message::system("Be terse."), Message::user("Hi")];

        let body = client.chat_body(&messages, ResponseFormat::Json, None, false);
        assert_eq!(body["format"], "json");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hi");
        assert!((body["options"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn chat_body_text_format_omits_hint() {
        let client = test_client();
        let body = client.chat_body(&[Message::user("Hi")], ResponseFormat::Text, Some(0.1), false);
        assert!(body.get("format").is_none());
        assert!((body["options"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn tool_role_maps_to_wire_tool() {
        let messages = vec![Message::tool("result text")];
        let api = OllamaClient::to_api_messages(&messages);
        assert_eq!(api[0]["role"], "tool");
    }

    #[test]
    fn stream_chunk_parses_done_marker() {
        let chunk: StreamChunk =
            serde_json::from_str(r#"{"model":"m","done":true}"#).unwrap();
        assert!(chunk.done);
        assert!(chunk.message.is_none());

        let chunk: StreamChunk = serde_json::from_str(
            r#"{"message":{"role":"assistant","content":"Hel"},"done":false}"#,
        )
        .unwrap();
        assert_eq!(chunk.message.unwrap().content, "Hel");
    }

    #[test]
    fn tags_response_parses_model_names() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models":[{"model":"phi4-mini"},{"model":"qwen2.5:3b"}]}"#,
        )
        .unwrap();
        let names: Vec<String> = tags.models.into_iter().map(|m| m.model).collect();
        assert_eq!(names, vec!["phi4-mini", "qwen2.5:3b"]);
    }

    #[tokio::test]
    async fn unreachable_backend_reports_unavailable() {
        // Port 1 is never an Ollama server; connection fails fast.
        let client = OllamaClient::new(&OllamaConfig {
            base_url: "http://127.0.0.1:1".into(),
            model: "phi4-mini".into(),
            temperature: 0.7,
            context_window: 4096,
        });

        let err = client
            .chat(&[Message::user("Hi")], ResponseFormat::Json, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Unavailable {
                attempts: MAX_RETRIES,
                ..
            }
        ));

        assert!(!client.health_check().await);
    }
}
