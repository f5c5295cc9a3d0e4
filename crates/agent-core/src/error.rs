//! Error Types

use std::time::Duration;

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Which budget a turn ran out of
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnLimit {
    /// Every allowed round ended in another tool call
    Rounds(usize),
    /// Wall-clock deadline for the whole turn
    Elapsed(Duration),
}

impl std::fmt::Display for TurnLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnLimit::Rounds(n) => write!(f, "tool-call round budget of {} exhausted", n),
            TurnLimit::Elapsed(d) => write!(f, "turn exceeded {:.1}s", d.as_secs_f64()),
        }
    }
}

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Missing or invalid configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Model endpoint unreachable or returned an error
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Turn exceeded its round or time budget
    #[error("Turn timed out: {0}")]
    TurnTimeout(TurnLimit),

    /// Parse error (e.g., malformed provider response)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// True for errors that abort a turn because the turn's budget ran out
    pub fn is_timeout(&self) -> bool {
        matches!(self, AgentError::TurnTimeout(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::ModelUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            AgentError::TurnTimeout(_) => {
                "The request took too long to process. Please try a simpler query.".into()
            }
            AgentError::ToolNotFound(name) => format!("The tool '{}' is not available.", name),
            AgentError::ToolValidation(msg) => format!("Invalid tool input: {}", msg),
            AgentError::ToolExecution(msg) => format!("Tool error: {}", msg),
            AgentError::Configuration(_) => "The assistant is not configured correctly.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Other(err.to_string())
    }
}
