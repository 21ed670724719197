//! LLM Provider implementations for sift.
//!
//! All providers implement the `sift_core::Provider` trait.
//! `build_from_config` selects the endpoint from configuration.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_from_config, default_base_url};
