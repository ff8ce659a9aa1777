//! The reasoning loop — Think → Act → Observe with a bounded iteration cap.
//!
//! Each iteration asks the model for a JSON-shaped reply, records a
//! [`ThoughtStep`], and either terminates with an answer or dispatches the
//! requested tool and feeds the observation back. Tool failures and unknown
//! tool names are observations, not errors — the only conditions that
//! escape the loop are backend unavailability and long-term-store failures.
//!
//! Intra-turn tool observations live only in the per-turn message list and
//! the thought trace; the persistent transcript window gains exactly one
//! user/assistant pair per turn.

use localclaw_core::client::{LlmClient, ResponseFormat};
use localclaw_core::error::Error;
use localclaw_core::message::Role;
use localclaw_core::tool::ToolRegistry;
use localclaw_memory::MemoryManager;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::parser::parse_reply;

/// Default iteration cap: bounds worst-case latency per turn.
const MAX_ITERATIONS: u32 = 5;

const PARSE_FAILURE_THOUGHT: &str = "(parse failure -- raw text used as answer)";
const EXHAUSTED_FALLBACK: &str =
    "I was unable to complete the request within the allowed steps.";

/// One iteration of the reasoning loop. Immutable once recorded.
#[derive(Debug, Clone, Serialize)]
pub struct ThoughtStep {
    pub iteration: u32,
    pub thought: String,
    pub action: Option<String>,
    pub action_input: Option<String>,
    pub observation: Option<String>,
}

/// Final result of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    pub answer: String,
    pub thought_trace: Vec<ThoughtStep>,
}

/// Executes the Think → Act → Observe cycle with a configurable cap.
pub struct ReasoningLoop {
    client: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    max_iterations: u32,
}

impl ReasoningLoop {
    pub fn new(client: Arc<dyn LlmClient>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            client,
            tools,
            max_iterations: MAX_ITERATIONS,
        }
    }

    /// Override the iteration cap.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Execute a full turn and return the final answer with its trace.
    ///
    /// The user input is appended to the transcript window up front; the
    /// final answer joins it as the assistant half of the pair on every
    /// terminal path. A not-reentrant call — the caller holds `&mut` memory
    /// for the whole turn.
    pub async fn run(
        &self,
        memory: &mut MemoryManager,
        user_input: &str,
    ) -> Result<AgentResponse, Error> {
        memory.add_message(Role::User, user_input);

        // Context window for this turn: system + recalled facts + transcript.
        // Tool observations are appended to this list only, never to the
        // persistent window.
        let mut messages = memory.build_context(user_input).await?;

        let mut trace: Vec<ThoughtStep> = Vec::new();

        info!(max_iterations = self.max_iterations, "Reasoning loop starting");

        for iteration in 1..=self.max_iterations {
            let raw = self
                .client
                .chat(&messages, ResponseFormat::Json, None)
                .await?;

            let (reply, parsed) = parse_reply(&raw);
            if !parsed {
                warn!(iteration, raw = %truncate(&raw, 200), "Failed to parse model output");
            }

            let mut step = ThoughtStep {
                iteration,
                thought: if parsed {
                    reply.thought
                } else {
                    PARSE_FAILURE_THOUGHT.to_string()
                },
                action: reply.action,
                action_input: reply.action_input,
                observation: None,
            };

            debug!(iteration, action = ?step.action, "Reasoning step");

            // Case 1: the model gives a final answer.
            // (If both action and answer are populated, action wins — the
            // answer is ignored until a later null-action iteration.)
            let Some(tool_name) = step.action.clone() else {
                let answer = reply
                    .answer
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or_else(|| raw.clone());
                trace.push(step);

                memory.add_message(Role::Assistant, &answer);
                info!(iterations = iteration, "Reasoning loop completed");
                return Ok(AgentResponse {
                    answer,
                    thought_trace: trace,
                });
            };

            // Case 2: the model wants a tool. Missing input becomes "" —
            // tools report their own validation problems as observations.
            let input = step.action_input.clone().unwrap_or_default();
            let observation = match self.tools.get(&tool_name) {
                None => format!("Error: unknown tool '{tool_name}'."),
                Some(tool) => match tool.invoke(&input).await {
                    Ok(output) => output,
                    Err(e) => format!("Tool error: {e}"),
                },
            };

            debug!(iteration, tool = %tool_name, observation = %truncate(&observation, 200), "Tool observed");

            step.observation = Some(observation.clone());
            trace.push(step);

            // Feed the observation back so the model can continue.
            messages.push(localclaw_core::Message::assistant(&raw));
            messages.push(localclaw_core::Message::tool(format!(
                "Tool '{tool_name}' returned this result:\n---\n{observation}\n---\n\
                 Now respond with a JSON object. If the result answers the question, \
                 set action to null and put your answer (based on the result above) \
                 in the answer field. If you need another tool, call it."
            )));
        }

        // Iteration cap reached: best-effort partial answer.
        warn!(max_iterations = self.max_iterations, "Iteration cap reached");
        let answer = trace
            .iter()
            .rev()
            .map(|s| s.thought.trim())
            .find(|t| !t.is_empty() && *t != PARSE_FAILURE_THOUGHT)
            .map(|t| t.to_string())
            .unwrap_or_else(|| EXHAUSTED_FALLBACK.to_string());

        memory.add_message(Role::Assistant, &answer);
        Ok(AgentResponse {
            answer,
            thought_trace: trace,
        })
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
