//! Parsing model output into a structured reply.
//!
//! Small local models frequently wrap JSON in markdown fences, prepend
//! prose, or abandon structure entirely. Parsing runs as a cascade, each
//! tier attempted only when the previous one fails:
//!
//! 1. Strict parse of the whole (trimmed) text
//! 2. Strip surrounding markdown code fences, retry
//! 3. Extract the first `{...}` brace-delimited substring, retry
//!
//! If everything fails, the raw text becomes a direct answer. A parse
//! failure is never an error — the loop must keep moving.

use serde::{Deserialize, Deserializer};

/// The four-key reply contract the model is asked to honor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelReply {
    /// The model's reasoning. Never shown to the user.
    #[serde(default, deserialize_with = "lenient_string")]
    pub thought: String,

    /// Tool name to invoke, or `None` to answer directly.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub action: Option<String>,

    /// The single string argument for the tool.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub action_input: Option<String>,

    /// The final answer; meaningful only when `action` is `None`.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub answer: Option<String>,
}

/// Accept any JSON scalar where a string is expected; models sometimes
/// emit bare numbers or booleans for `action_input`.
fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(de)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Parse raw model output through the fallback cascade.
///
/// Returns the reply and whether any structured tier succeeded. On total
/// failure the reply carries the raw text as its answer so the turn can
/// still terminate usefully.
pub fn parse_reply(raw: &str) -> (ModelReply, bool) {
    let trimmed = raw.trim();

    // Tier 1: the whole text is the object.
    if let Some(reply) = try_parse(trimmed) {
        return (reply, true);
    }

    // Tier 2: strip markdown code fences.
    if let Some(inner) = strip_fences(trimmed)
        && let Some(reply) = try_parse(inner)
    {
        return (reply, true);
    }

    // Tier 3: first brace-delimited substring.
    if let Some(inner) = extract_braced(trimmed)
        && let Some(reply) = try_parse(inner)
    {
        return (reply, true);
    }

    // Fallback: treat the raw text as a direct answer.
    (
        ModelReply {
            thought: String::new(),
            action: None,
            action_input: None,
            answer: Some(raw.to_string()),
        },
        false,
    )
}

fn try_parse(text: &str) -> Option<ModelReply> {
    let mut reply: ModelReply = serde_json::from_str(text).ok()?;
    reply.action = normalize_action(reply.action);
    Some(reply)
}

/// Models sometimes spell null as the string "null" or "none".
fn normalize_action(action: Option<String>) -> Option<String> {
    action.filter(|a| {
        let a = a.trim();
        !a.is_empty() && !a.eq_ignore_ascii_case("null") && !a.eq_ignore_ascii_case("none")
    })
}

/// Strip a surrounding markdown code fence (```json ... ``` or ``` ... ```).
fn strip_fences(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    // Drop the info string ("json", "JSON", ...) on the opening line.
    let body_start = rest.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &rest[body_start..];
    let body = body.strip_suffix("```").unwrap_or(body);
    Some(body.trim())
}

/// The first `{` through the last `}` of the text, if both exist.
fn extract_braced(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
