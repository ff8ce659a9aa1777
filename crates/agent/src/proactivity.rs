//! Proactivity engine — suggests actions based on pending tasks.
//!
//! Two triggers:
//! - **Startup**: once per engine lifetime, mention how many tasks are open.
//! - **After a task mutation**: if a pending task looks actionable (contains
//!   a verb the agent's tools can serve), offer to act on it.
//!
//! The engine only produces suggestion strings. It never calls back into
//! the reasoning loop — every suggested action waits for a user turn.

use localclaw_todo::TodoStore;
use std::sync::Arc;

/// Keywords that hint a task is actionable via tools.
const ACTIONABLE_KEYWORDS: [&str; 6] = ["find", "search", "check", "look up", "get", "fetch"];

/// Lifecycle of the one-shot startup check. An explicit state, not a
/// hidden flag — callers can inspect where the engine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupCheck {
    NotYetChecked,
    Checked,
}

pub struct ProactivityEngine {
    store: Arc<TodoStore>,
    startup: StartupCheck,
}

impl ProactivityEngine {
    pub fn new(store: Arc<TodoStore>) -> Self {
        Self {
            store,
            startup: StartupCheck::NotYetChecked,
        }
    }

    /// Current startup-check state.
    pub fn startup_state(&self) -> StartupCheck {
        self.startup
    }

    /// One-shot: returns a suggestion if pending tasks exist, then latches.
    pub async fn check_on_startup(&mut self) -> Option<String> {
        if self.startup == StartupCheck::Checked {
            return None;
        }
        self.startup = StartupCheck::Checked;

        let pending = self.store.get_pending().await;
        match pending.len() {
            0 => None,
            1 => Some(format!(
                "I see you have an unfinished task: \"{}\". Want me to work on it?",
                pending[0].text
            )),
            count => Some(format!(
                "I see you have {count} unfinished tasks. Want me to help with one of them?"
            )),
        }
    }

    /// After a to-do mutation: offer to act on the first actionable task.
    pub async fn check_after_task_update(&self) -> Option<String> {
        let pending = self.store.get_pending().await;

        pending.iter().find_map(|task| {
            let text = task.text.to_lowercase();
            ACTIONABLE_KEYWORDS
                .iter()
                .any(|kw| text.contains(kw))
                .then(|| {
                    format!(
                        "I notice the task \"{}\" looks like something I can help with. \
                         Shall I do it now?",
                        task.text
                    )
                })
        })
    }
}
