//! The localclaw agent core.
//!
//! The agent follows a **Think → Act → Observe** cycle:
//!
//! 1. **Receive** a user message
//! 2. **Build context** (system prompt + recalled facts + transcript window)
//! 3. **Ask the model** for a JSON-shaped reply
//! 4. **If it names a tool**: invoke it, feed the observation back, loop
//! 5. **If it answers**: return the answer and the full thought trace
//!
//! The loop is bounded by an iteration cap; every step is recorded in the
//! per-turn thought trace for auditability.

pub mod facade;
pub mod parser;
pub mod proactivity;
pub mod prompts;
pub mod reasoning;

pub use facade::AgentCore;
pub use parser::{ModelReply, parse_reply};
pub use proactivity::{ProactivityEngine, StartupCheck};
pub use reasoning::{AgentResponse, ReasoningLoop, ThoughtStep};
