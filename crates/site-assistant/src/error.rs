//! Error Types for the Site Assistant

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Update feed '{feed}' unavailable: {reason}")]
    FeedUnavailable { feed: String, reason: String },
}

impl From<AssistantError> for AgentError {
    fn from(err: AssistantError) -> Self {
        AgentError::ToolExecution(err.to_string())
    }
}
