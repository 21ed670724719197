//! Tool trait: the abstraction over agent capabilities.
//!
//! The tool set is small and closed: raw HTTP fetch, adaptive scraping and
//! regex extraction. Each is registered once at startup in a name-keyed
//! [`ToolRegistry`]; there is no runtime discovery.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ToolError;

/// Substrings that mark a tool result as a failure. Tools report their own
/// failures as `Ok` text containing one of these.
pub const ERROR_MARKERS: [&str; 8] = [
    "Error:",
    "HTTP Error",
    "Failed to",
    "Unable to",
    "Connection refused",
    "Timeout",
    "Not Found",
    "Forbidden",
];

/// Whether a tool result reads as a failure. Matches the fixed
/// [`ERROR_MARKERS`] list; failures worded otherwise read as content.
pub fn is_error_result(result: &str) -> bool {
    ERROR_MARKERS.iter().any(|marker| result.contains(marker))
}

/// The capability family a tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Raw HTTP GET of a URL.
    Fetch,
    /// Adaptive text extraction from a URL (static or rendered).
    Scrape,
    /// Pure text transformation, no network.
    Extract,
}

impl ToolKind {
    /// Whether the tool takes a URL and retrieves remote content.
    pub fn fetches_url(self) -> bool {
        matches!(self, Self::Fetch | Self::Scrape)
    }
}

/// A tool's immutable identity, surfaced to the LLM prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub kind: ToolKind,
}

/// The core Tool trait.
///
/// Tools are stateless and idempotent from the caller's perspective; they
/// may retry or throttle internally.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "scraper", "parser").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// Which capability family this tool belongs to.
    fn kind(&self) -> ToolKind;

    /// Execute the tool with the raw action input.
    async fn execute(&self, input: &str) -> Result<String, ToolError>;

    /// Convert this tool into a descriptor for the prompt.
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            kind: self.kind(),
        }
    }
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Describe the tools in every prompt
/// 2. Map the model's chosen action onto a registered name
/// 3. Look up the tool to execute
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by its exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Resolve a name case-insensitively to the registered spelling.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let wanted = name.trim();
        self.tools
            .keys()
            .find(|k| k.eq_ignore_ascii_case(wanted))
            .map(|k| k.as_str())
    }

    /// Descriptors of all tools, ordered by name.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.values().map(|t| t.descriptor()).collect()
    }

    /// All registered tool names, ordered.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
