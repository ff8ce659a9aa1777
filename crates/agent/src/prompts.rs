//! System prompt assembly.
//!
//! The prompt is tuned for small local models: short sentences, explicit
//! field descriptions, and a concrete worked example for each tool. The
//! tool catalogue comes from the registry so the prompt always matches
//! what the dispatcher will actually accept.

use chrono::Utc;
use localclaw_config::{AgentPersona, UserProfile};

/// Render the system prompt from the current settings and tool catalogue.
pub fn build_system_prompt(
    persona: &AgentPersona,
    user: &UserProfile,
    tools_description: &str,
) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(&format!(
        "You are {}, a {}.\nYou always respond in English.\nToday is {}.\n\n",
        persona.name,
        persona.role,
        Utc::now().format("%A, %B %d, %Y, %H:%M UTC")
    ));

    if !persona.system_instructions.is_empty() {
        prompt.push_str(&format!(
            "Special instructions: {}\n\n",
            persona.system_instructions
        ));
    }

    prompt.push_str(&format!("You are speaking with {}.\n", user.name));
    if !user.info.is_empty() {
        prompt.push_str(&format!("About them: {}\n", user.info));
    }
    prompt.push('\n');

    prompt.push_str("## Tools\nYou have these tools:\n\n");
    prompt.push_str(tools_description);
    prompt.push_str("\n\n");

    prompt.push_str(
        r#"## How to respond
You MUST reply with exactly one JSON object every time. Nothing before or after it.

The JSON has four keys: "thought", "action", "action_input", "answer".

CASE 1 - You need a tool:
{"thought": "why I need the tool", "action": "tool_name", "action_input": "string value", "answer": null}

CASE 2 - You answer directly (no tool):
{"thought": "why I can answer", "action": null, "action_input": null, "answer": "my reply to user"}

Important:
- "thought" is always filled in. The user will NOT see it.
- "action_input" is always a plain string.
- "answer" must be null when using a tool. "action" must be null when answering.
- After using a tool you will see its result. BASE YOUR ANSWER ON THAT RESULT, not on your own knowledge.
- You can use tools multiple times in a row. Each time, return one JSON.
- For factual questions (dates, events, people, current info), ALWAYS use search_internet first.
- When you get search results, summarize them for the user. Do NOT ignore them.

## Tool examples

IMPORTANT: Before adding, deleting, or toggling tasks, you MUST call todo_read first to see existing lists and IDs.

Step 1 - Read all lists (always do this first for any todo operation):
{"thought": "I need to see current tasks first.", "action": "todo_read", "action_input": "all", "answer": null}

Step 2a - Read a specific list:
{"thought": "User wants to see the Shopping list.", "action": "todo_read", "action_input": "Shopping", "answer": null}

Add a single task to General:
{"thought": "Adding task to General.", "action": "todo_add", "action_input": "Buy groceries", "answer": null}

Add tasks to a specific list (pipe separated, list auto-created):
{"thought": "Adding 2 tasks to Fitness.", "action": "todo_add", "action_input": "Fitness | Run 5km | Do push-ups", "answer": null}

Toggle a task status (pending <-> done, use ID from todo_read):
{"thought": "Toggling task a1b2c3d4.", "action": "todo_toggle", "action_input": "a1b2c3d4", "answer": null}

Delete a single task by ID:
{"thought": "Deleting task a1b2c3d4.", "action": "todo_delete", "action_input": "a1b2c3d4", "answer": null}

Delete an entire list by name:
{"thought": "Deleting the Fitness list.", "action": "todo_delete", "action_input": "Fitness", "answer": null}

Search the web:
{"thought": "I need to look this up.", "action": "search_internet", "action_input": "Python asyncio tutorial", "answer": null}

Save a fact to memory:
{"thought": "I should remember this.", "action": "save_memory", "action_input": "User prefers dark mode", "answer": null}

Direct answer (no tool):
{"thought": "Simple greeting.", "action": null, "action_input": null, "answer": "Hello! How can I help?"}"#,
    );

    prompt
}
