//! Ollama LLM Provider
//!
//! Implementation of `LlmProvider` for local Ollama inference. Tools are
//! offered through the [prompt protocol](crate::prompt_protocol).

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider},
    tool::ToolSchema,
};
use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{ChatMessage, MessageRole, request::ChatMessageRequest},
    Ollama,
};

use crate::prompt_protocol::{parse_tool_calls, render_tool_call, tools_prompt_section};

/// Default model for local inference
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read `OLLAMA_HOST` / `OLLAMA_PORT` through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("OLLAMA_HOST").unwrap_or_else(|| "http://localhost".into());
        let port = match lookup("OLLAMA_PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                AgentError::Configuration(format!("OLLAMA_PORT is not a port number: {}", raw))
            })?,
            None => 11434,
        };

        Ok(Self { host, port })
    }
}

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
}

impl OllamaProvider {
    /// Create a new Ollama provider with custom host/port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::from_config(OllamaConfig {
            host: host.into(),
            port,
        })
    }

    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Self {
        Self {
            client: Ollama::new(&config.host, config.port),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(OllamaConfig::from_env()?))
    }

    /// Convert agent messages to Ollama format
    fn convert_messages(messages: &[Message], tools: &[ToolSchema]) -> Vec<ChatMessage> {
        messages
            .iter()
            .map(|m| match m.role {
                Role::System if !tools.is_empty() => ChatMessage::new(
                    MessageRole::System,
                    format!("{}\n\n{}", m.content, tools_prompt_section(tools)),
                ),
                Role::System => ChatMessage::new(MessageRole::System, m.content.clone()),
                Role::User => ChatMessage::new(MessageRole::User, m.content.clone()),
                Role::Assistant => {
                    let mut content = m.content.clone();
                    for call in &m.tool_calls {
                        if !content.is_empty() {
                            content.push('\n');
                        }
                        content.push_str(&render_tool_call(call));
                    }
                    ChatMessage::new(MessageRole::Assistant, content)
                }
                // Tool results appear as user context
                Role::Tool => ChatMessage::new(MessageRole::User, m.content.clone()),
            })
            .collect()
    }

    fn convert_reply(content: &str, model: &str) -> Completion {
        let (prose, tool_calls) = parse_tool_calls(content);
        let finish_reason = if tool_calls.is_empty() {
            FinishReason::Stop
        } else {
            FinishReason::ToolUse
        };

        Completion {
            content: Some(prose),
            tool_calls,
            model: model.to_string(),
            usage: None,
            finish_reason: Some(finish_reason),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = ChatMessageRequest::new(
            options.model.clone(),
            Self::convert_messages(messages, tools),
        );

        let response = self.client
            .send_chat_messages(request)
            .await
            .map_err(|e| AgentError::ModelUnavailable(e.to_string()))?;

        Ok(Self::convert_reply(&response.message.content, &options.model))
    }
}
