//! Parser tool: pulls email addresses or URLs out of a block of text.
//!
//! Input format: the first word is the command, `emails` or
//! `urls`; everything after it is the text to scan.

use async_trait::async_trait;
use regex::Regex;
use sift_core::error::ToolError;
use sift_core::tool::{Tool, ToolKind};
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.\-]+@[\w.\-]+\.\w+").unwrap());
static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

pub struct ParserTool;

impl ParserTool {
    /// Split the input into (command, text). The command ends at the first
    /// whitespace or colon, so "emails: a@b.com" works on a single line.
    fn split_command(input: &str) -> (String, &str) {
        let input = input.trim();
        let end = input
            .find(|c: char| c.is_whitespace() || c == ':')
            .unwrap_or(input.len());
        let text = input[end..].trim_start_matches(|c: char| c.is_whitespace() || c == ':');
        (input[..end].to_lowercase(), text)
    }

    fn extract(re: &Regex, text: &str, none_found: &str) -> String {
        let matches: Vec<&str> = re.find_iter(text).map(|m| m.as_str()).collect();
        if matches.is_empty() {
            none_found.to_string()
        } else {
            matches.join(", ")
        }
    }
}

#[async_trait]
impl Tool for ParserTool {
    fn name(&self) -> &str {
        "parser"
    }

    fn description(&self) -> &str {
        "Extract all email addresses or URLs from text. Input: 'emails' or 'urls' followed by the text."
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Extract
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let (command, text) = Self::split_command(input);
        let output = match command.as_str() {
            "emails" => Self::extract(&EMAIL_RE, text, "No emails found."),
            "urls" => Self::extract(&URL_RE, text, "No URLs found."),
            other => format!("Unknown parser command: {other}. Use 'emails' or 'urls'."),
        };
        Ok(output)
    }
}
