//! # localclaw Core
//!
//! Domain types, traits, and error definitions for the localclaw agent.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (LLM backend, vector store, tools) is defined
//! as a trait here. Implementations live in their respective crates. This
//! enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod client;
pub mod error;
pub mod message;
pub mod tool;
pub mod vector;

// Re-export key types at crate root for ergonomics
pub use client::{LlmClient, ResponseFormat};
pub use error::{ClientError, Error, MemoryError, Result, ToolError};
pub use message::{Message, Role};
pub use tool::{Tool, ToolRegistry};
pub use vector::{MemoryRecord, MemoryResult, VectorStore};
