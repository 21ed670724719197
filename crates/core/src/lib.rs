//! # sift core
//!
//! Domain types, traits, and error definitions for the sift agent.
//! This crate has **no framework dependencies**; it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the agent loop is a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping the LLM backend via configuration
//! - Easy testing with scripted providers and stub tools
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod state;
pub mod text;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, ToolError};
pub use message::{Message, Role};
pub use provider::Provider;
pub use state::AgentState;
pub use tool::{Tool, ToolDescriptor, ToolKind, ToolRegistry, is_error_result};
