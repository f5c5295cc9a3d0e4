//! Turn Records
//!
//! A [`Turn`] is the ephemeral record of one request/response cycle. It is
//! created by the runner, handed back with the final output, and never
//! stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tool::{ToolCall, ToolResult};

/// Where a turn is in the dispatch loop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    AwaitingModelDecision,
    ExecutingTools(usize),
    ProducingFinalOutput,
    Done,
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::AwaitingModelDecision => write!(f, "AWAITING_MODEL_DECISION"),
            TurnState::ExecutingTools(n) => write!(f, "EXECUTING_TOOLS({})", n),
            TurnState::ProducingFinalOutput => write!(f, "PRODUCING_FINAL_OUTPUT"),
            TurnState::Done => write!(f, "DONE"),
        }
    }
}

/// One tool call made during a turn
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Round (1-based) the call was made in
    pub round: usize,
    pub tool_name: String,
    pub query: String,
    pub output: String,
    pub success: bool,
}

/// Record of a single turn
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,

    /// Agent the turn ran against
    pub agent: String,

    /// User text the turn answered
    pub input: String,

    /// Tool calls in the order they were declared
    pub invocations: Vec<ToolInvocation>,

    /// Model decisions requested so far
    pub rounds: usize,

    pub state: TurnState,

    pub started_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Turn {
    pub fn new(agent: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent: agent.into(),
            input: input.into(),
            invocations: Vec::new(),
            rounds: 0,
            state: TurnState::AwaitingModelDecision,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub(crate) fn transition(&mut self, next: TurnState) {
        tracing::trace!(turn = %self.id, from = %self.state, to = %next, "Turn state");
        self.state = next;
    }

    pub(crate) fn record(&mut self, round: usize, call: &ToolCall, result: &ToolResult) {
        self.invocations.push(ToolInvocation {
            round,
            tool_name: call.name.clone(),
            query: call.query().unwrap_or_default().to_string(),
            output: result.output.clone(),
            success: result.success,
        });
    }

    pub(crate) fn finish(&mut self) {
        self.transition(TurnState::Done);
        self.finished_at = Some(Utc::now());
    }

    /// Names of the tools invoked, in order
    pub fn tool_names(&self) -> Vec<&str> {
        self.invocations.iter().map(|i| i.tool_name.as_str()).collect()
    }

    /// Wall-clock time spent, once finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_lifecycle() {
        let mut turn = Turn::new("AI_Chatbot_Agent", "hi");
        assert_eq!(turn.state, TurnState::AwaitingModelDecision);
        assert!(turn.duration().is_none());

        let call = ToolCall::new("Payment_Agent", "payment methods");
        turn.record(1, &call, &ToolResult::success("Payment_Agent", "cards"));
        turn.finish();

        assert_eq!(turn.state, TurnState::Done);
        assert_eq!(turn.tool_names(), vec!["Payment_Agent"]);
        assert_eq!(turn.invocations[0].query, "payment methods");
        assert!(turn.duration().is_some());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(TurnState::ExecutingTools(3).to_string(), "EXECUTING_TOOLS(3)");
    }
}
