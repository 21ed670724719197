//! Lenient parsing of the model's decision reply.
//!
//! Models wrap JSON in code fences, prefix it with prose, or skip it
//! entirely. Parsing never fails: a reply with no usable object becomes a
//! Final Answer carrying the raw text.

use serde_json::{Map, Value};
use sift_core::tool::ToolRegistry;

use super::prompt::FINAL_ANSWER;

/// Thought recorded when the reply carried no decision object.
pub const FALLBACK_THOUGHT: &str = "No structured response";

const FINAL_ALIASES: [&str; 3] = ["final answer", "finalanswer", "finish"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub thought: String,
    /// A registered tool name or [`FINAL_ANSWER`].
    pub action: String,
    pub action_input: String,
}

pub fn parse_response(response: &str, tools: &ToolRegistry) -> ParsedAction {
    let text = strip_code_fences(response);

    let Some(fields) = json_objects(&text).find_map(decision_fields) else {
        return ParsedAction {
            thought: FALLBACK_THOUGHT.to_string(),
            action: FINAL_ANSWER.to_string(),
            action_input: response.trim().to_string(),
        };
    };

    let [thought, action, action_input] = fields;
    ParsedAction {
        thought,
        action: map_action(&action, tools),
        action_input,
    }
}

/// Map a model-chosen action onto a registered tool name. Anything that is
/// neither a tool nor a Final Answer alias becomes a Final Answer.
fn map_action(action: &str, tools: &ToolRegistry) -> String {
    let lowered = action.trim().to_lowercase();
    if FINAL_ALIASES.contains(&lowered.as_str()) {
        return FINAL_ANSWER.to_string();
    }
    tools
        .resolve(action)
        .unwrap_or(FINAL_ANSWER)
        .to_string()
}

fn strip_code_fences(response: &str) -> String {
    response
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The three decision fields, when `candidate` is an object carrying all of them.
fn decision_fields(candidate: &str) -> Option<[String; 3]> {
    let object: Map<String, Value> = serde_json::from_str(candidate).ok()?;
    let field = |key: &str| object.get(key).map(stringify);
    Some([field("thought")?, field("action")?, field("action_input")?])
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Every balanced `{...}` span in `text`, outermost first by start position.
/// Braces inside JSON strings are ignored.
fn json_objects(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .filter(|&(_, c)| c == '{')
        .filter_map(move |(start, _)| balanced_end(&text[start..]).map(|end| &text[start..start + end]))
}

/// Byte length of the balanced object at the start of `text`.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
