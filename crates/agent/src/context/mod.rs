//! Everything the agent carries between and around model calls: the prompt
//! it sends, the reply parser, and the per-request action record.

pub mod parse;
pub mod prompt;
pub mod record;

pub use parse::{FALLBACK_THOUGHT, ParsedAction, parse_response};
pub use prompt::{FINAL_ANSWER, build_prompt, summary_prompt};
pub use record::ActionRecord;
