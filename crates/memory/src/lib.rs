//! Memory system for localclaw.
//!
//! Two tiers:
//! - **Short-term**: a token-budgeted sliding window over the live transcript
//! - **Long-term**: a similarity-searchable store of persisted facts
//!
//! The [`MemoryManager`] composes both and builds the per-turn context
//! window the reasoning loop sends to the model.

pub mod embedding;
pub mod file_store;
pub mod in_memory;
pub mod manager;
pub mod short_term;
pub mod token;

pub use embedding::{cosine_distance, cosine_similarity, embed};
pub use file_store::FileStore;
pub use in_memory::InMemoryStore;
pub use manager::MemoryManager;
pub use short_term::ShortTermMemory;
pub use token::{TokenEstimator, estimate_tokens};
