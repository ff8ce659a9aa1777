//! Internet search tool backed by the DuckDuckGo HTML endpoint.
//!
//! Fetches the no-JavaScript results page and extracts titles, URLs, and
//! snippets by scanning for the stable `result__` CSS markers. Failures
//! (network down, layout change) come back as error text for the agent to
//! observe — a search problem must never kill the reasoning loop.

use async_trait::async_trait;
use localclaw_core::error::ToolError;
use localclaw_core::tool::Tool;
use std::time::Duration;
use tracing::debug;

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const MAX_RESULTS: usize = 3;

pub struct SearchInternetTool {
    client: reqwest::Client,
}

impl SearchInternetTool {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("Mozilla/5.0 (compatible; localclaw/0.1)")
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

impl Default for SearchInternetTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SearchInternetTool {
    fn name(&self) -> &str {
        "search_internet"
    }

    fn description(&self) -> &str {
        "Search the web. Returns titles, URLs, and snippets."
    }

    fn parameter_hint(&self) -> &str {
        "search query string"
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Ok("Error: empty search query.".into());
        }

        debug!(query, "Searching the web");

        let response = self
            .client
            .post(SEARCH_URL)
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "search_internet".into(),
                reason: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Ok(format!(
                "Search error: server returned status {}.",
                response.status().as_u16()
            ));
        }

        let html = response.text().await.map_err(|e| ToolError::ExecutionFailed {
            tool_name: "search_internet".into(),
            reason: format!("failed to read response body: {e}"),
        })?;

        let results = extract_results(&html, MAX_RESULTS);
        if results.is_empty() {
            return Ok("No results found.".into());
        }

        let formatted: Vec<String> = results
            .into_iter()
            .map(|r| format!("Title: {}\nURL: {}\n{}\n", r.title, r.url, r.snippet))
            .collect();
        Ok(formatted.join("\n").trim().to_string())
    }
}

struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

/// Extract up to `limit` results from the DuckDuckGo HTML results page.
fn extract_results(html: &str, limit: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();
    let mut cursor = 0;

    while results.len() < limit {
        // Each result block starts with the titled anchor.
        let Some(anchor) = html[cursor..].find("class=\"result__a\"") else {
            break;
        };
        let block_start = cursor + anchor;

        let Some((url, title, title_end)) = extract_anchor(&html[block_start..]) else {
            cursor = block_start + 1;
            continue;
        };

        // The snippet follows within the same result block.
        let after_title = block_start + title_end;
        let snippet = html[after_title..]
            .find("result__snippet")
            .and_then(|s| {
                let snippet_start = after_title + s;
                extract_tag_text(&html[snippet_start..])
            })
            .unwrap_or_default();

        if !title.is_empty() && !url.is_empty() {
            results.push(SearchResult {
                title,
                url,
                snippet,
            });
        }
        cursor = after_title;
    }

    results
}

/// Pull (href, inner text, offset past the anchor) out of a result anchor.
fn extract_anchor(fragment: &str) -> Option<(String, String, usize)> {
    let href_start = fragment.find("href=\"")? + 6;
    let href_end = fragment[href_start..].find('"')? + href_start;
    let url = decode_entities(&fragment[href_start..href_end]);

    let text_start = fragment[href_end..].find('>')? + href_end + 1;
    let text_end = fragment[text_start..].find("</a>")? + text_start;
    let title = strip_tags(&fragment[text_start..text_end]);

    Some((url, title, text_end + 4))
}

/// Inner text of the tag whose attribute list the fragment starts inside.
fn extract_tag_text(fragment: &str) -> Option<String> {
    let text_start = fragment.find('>')? + 1;
    let text_end = fragment[text_start..].find('<')? + text_start;
    let mut end = text_end;
    // Snippets may contain <b> highlights; keep scanning to the closing tag.
    if let Some(close) = fragment[text_start..].find("</a>").or_else(|| {
        fragment[text_start..].find("</td>")
    }) {
        end = text_start + close;
    }
    Some(strip_tags(&fragment[text_start..end]))
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    decode_entities(out.trim())
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
}
