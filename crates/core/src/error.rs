//! Error types for the localclaw domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level `Error`
//! aggregates them for callers that cross context boundaries.

use thiserror::Error;

/// The top-level error type for all localclaw operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- LLM backend errors ---
    #[error("Backend error: {0}")]
    Client(#[from] ClientError),

    // --- Long-term memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the inference backend.
///
/// `Unavailable` is the terminal transport condition: it is produced only
/// after the client has exhausted its bounded retries. Malformed model
/// output is NOT an error here — the agent's parsing cascade absorbs it.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend unavailable after {attempts} attempts: {message}")]
    Unavailable { attempts: u32, message: String },
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool already registered: {0}")]
    DuplicateName(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_displays_correctly() {
        let err = Error::Client(ClientError::Unavailable {
            attempts: 3,
            message: "connection refused".into(),
        });
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::DuplicateName("search_internet".into()));
        assert!(err.to_string().contains("search_internet"));
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn memory_error_converts_to_top_level() {
        let err: Error = MemoryError::Storage("disk full".into()).into();
        assert!(matches!(err, Error::Memory(_)));
    }
}
