//! Inference backend clients for localclaw.
//!
//! Currently a single backend: Ollama over its native HTTP API.

pub mod ollama;

pub use ollama::OllamaClient;
