//! Agent patterns. One pattern ships: [`ReactAgent`], a single-action
//! Think-Act-Observe step with early termination on conclusive results.

use async_trait::async_trait;
use sift_core::state::AgentState;

use crate::context::ActionRecord;

pub mod react;

pub use react::ReactAgent;

/// One reasoning step: consume a state, return the next one.
///
/// A terminal input must come back unchanged. `record` belongs to the
/// current request only.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn step(&self, state: &AgentState, record: &mut ActionRecord) -> AgentState;
}

#[cfg(test)]
pub(crate) mod test_helpers;
