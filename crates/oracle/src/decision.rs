//! Decision Parsing
//!
//! Turns a raw oracle answer into a typed [`Decision`]. The answer must
//! contain a single JSON object `{"tool": <name>, "parameters": {...}}`;
//! models frequently wrap it in code fences or surrounding prose, so the
//! first balanced JSON object is extracted before parsing.
//!
//! Failure semantics: a malformed answer is an [`CoreError::OracleParse`]
//! that fails the round; an unknown tool name is a [`CoreError::UnknownTool`].
//! Neither falls through to a lenient "pass".

use serde::Deserialize;
use serde_json::Value;

use segflow_core::{CoreError, CoreResult, Decision};

#[derive(Debug, Deserialize)]
struct DecisionEnvelope {
    tool: String,
    #[serde(default)]
    parameters: Value,
}

/// Parse a raw oracle answer into a typed decision.
pub fn parse_decision(answer: &str) -> CoreResult<Decision> {
    let body = extract_json_object(answer).ok_or_else(|| {
        CoreError::oracle_parse(format!(
            "No JSON object found in oracle answer: {}",
            truncate(answer, 120)
        ))
    })?;

    let envelope: DecisionEnvelope = serde_json::from_str(body)
        .map_err(|e| CoreError::oracle_parse(format!("Malformed decision object: {}", e)))?;

    Decision::parse(&envelope.tool, &envelope.parameters)
}

/// Extract the first balanced top-level JSON object from a text blob.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}
