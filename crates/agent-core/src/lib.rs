//! # agent-core
//!
//! Provider-agnostic agent dispatch: tools, agents, agents exposed as tools,
//! and the runner that lets a model delegate to them.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Orchestrator Agent                        │
//! │  ┌─────────────┐  ┌──────────────────────┐  ┌──────────────┐  │
//! │  │   Runner    │  │  Tools (ordered)     │  │ ModelBinding │  │
//! │  │  rounds ────│──│  AgentTool ─▶ Agent  │──│ LlmProvider  │  │
//! │  └─────────────┘  └──────────────────────┘  └──────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait is the single seam to the model: it receives the
//! conversation plus tool descriptors and returns a completion the runner
//! reads as a [`Decision`].

pub mod agent;
pub mod error;
pub mod message;
pub mod provider;
pub mod runner;
pub mod tool;
pub mod turn;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use agent::{Agent, AgentBuilder, AgentTool};
pub use error::{AgentError, Result, TurnLimit};
pub use message::{Conversation, Message, Role};
pub use provider::{Completion, Decision, GenerationOptions, LlmProvider, ModelBinding};
pub use runner::{RunConfig, RunContext, RunResult, Runner};
pub use tool::{FunctionTool, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
pub use turn::{ToolInvocation, Turn, TurnState};
