//! # agent-runtime
//!
//! Concrete model providers for the agent system.
//!
//! ## Providers
//!
//! - **OpenAI-compatible** (default): chat-completions with native function
//!   calling; defaults to Gemini's OpenAI-compatible endpoint
//! - **Ollama**: local inference, tools offered through a prompt protocol
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::openai::OpenAiProvider;
//!
//! let provider = Arc::new(OpenAiProvider::from_env()?);
//! let model = ModelBinding::new(provider, GenerationOptions::for_model("gemini-2.0-flash"));
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub mod prompt_protocol;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, GenerationOptions, LlmProvider, Message, ModelBinding, Result, Role,
    RunConfig, Runner, Tool,
};
