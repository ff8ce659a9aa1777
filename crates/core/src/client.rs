//! LlmClient trait — the abstraction over the inference backend.
//!
//! The agent calls `chat()` or `chat_stream()` without knowing which backend
//! is being used. The contract is intentionally narrow: the backend returns
//! raw text, and the agent parses structure out of it itself. Small local
//! models cannot be trusted to honor a JSON schema, so the format hint is a
//! bias, not a guarantee.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::message::Message;

/// Generation-time output constraint requested from the backend.
///
/// `Json` asks for JSON-constrained sampling where the backend supports it
/// (Ollama's `format: "json"`). The agent must still function when the
/// backend ignores the hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Free-form text.
    Text,
    /// JSON-biased sampling.
    #[default]
    Json,
}

/// The core inference-backend trait.
///
/// Implementations are expected to apply bounded retry with backoff for
/// transient transport failures before surfacing
/// [`ClientError::Unavailable`]. Malformed output is never a transport
/// concern and must not be retried here.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// A human-readable name for this backend (e.g., "ollama").
    fn name(&self) -> &str;

    /// Send messages and return the full assistant response text.
    async fn chat(
        &self,
        messages: &[Message],
        format: ResponseFormat,
        temperature: Option<f32>,
    ) -> std::result::Result<String, ClientError>;

    /// Send messages and receive response chunks as they are generated.
    ///
    /// The stream is finite and not restartable. The default implementation
    /// calls `chat()` and yields the result as a single chunk.
    async fn chat_stream(
        &self,
        messages: &[Message],
        temperature: Option<f32>,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<String, ClientError>>,
        ClientError,
    > {
        let text = self.chat(messages, ResponseFormat::Text, temperature).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let _ = tx.send(Ok(text)).await;
        Ok(rx)
    }

    /// Health check — is the backend reachable and the model present?
    async fn health_check(&self) -> bool;

    /// List model names available on the backend.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ClientError>;
}
