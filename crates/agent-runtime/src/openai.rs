//! OpenAI-compatible LLM Provider
//!
//! Implementation of `LlmProvider` for any endpoint speaking the OpenAI
//! chat-completions dialect with native function calling. The defaults point
//! at Gemini's OpenAI-compatible endpoint.

use std::collections::HashMap;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
    tool::{ToolCall, ToolSchema, QUERY_PARAM},
};
use async_trait::async_trait;
use serde::Deserialize;

/// Gemini's OpenAI-compatible base URL
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

/// Default model on the Gemini endpoint
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// OpenAI-compatible provider configuration
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Bearer credential
    pub api_key: String,

    /// Base URL; `/chat/completions` is appended
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_OPENAI_BASE_URL.into(),
            timeout_secs: 120,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read `GEMINI_API_KEY` (required) and `MODEL_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AgentError::Configuration(format!(
                    "{} environment variable is not set.",
                    API_KEY_VAR
                ))
            })?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup("MODEL_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = base_url;
        }
        Ok(config)
    }
}

/// OpenAI-compatible LLM provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Create from configuration
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OpenAiConfig::from_env()?)
    }

    /// Replace the HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Convert one agent message to the chat-completions JSON shape
    fn message_to_json(msg: &Message) -> serde_json::Value {
        match msg.role {
            Role::Assistant if !msg.tool_calls.is_empty() => {
                let tool_calls: Vec<serde_json::Value> = msg
                    .tool_calls
                    .iter()
                    .map(|call| {
                        serde_json::json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": serde_json::Value::Object(
                                    call.arguments.clone().into_iter().collect()
                                ).to_string(),
                            }
                        })
                    })
                    .collect();

                let content = if msg.content.is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::json!(msg.content)
                };

                serde_json::json!({
                    "role": "assistant",
                    "content": content,
                    "tool_calls": tool_calls,
                })
            }
            Role::Tool => serde_json::json!({
                "role": "tool",
                "tool_call_id": msg.tool_call_id,
                "content": msg.content,
            }),
            ref role => serde_json::json!({
                "role": role.to_string(),
                "content": msg.content,
            }),
        }
    }

    fn build_body(
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = messages.iter().map(Self::message_to_json).collect();

        let mut body = serde_json::json!({
            "model": options.model,
            "messages": messages,
            "temperature": options.temperature,
            "top_p": options.top_p,
            "max_tokens": options.max_tokens,
        });

        if !tools.is_empty() {
            let definitions: Vec<serde_json::Value> = tools
                .iter()
                .map(|schema| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": schema.name,
                            "description": schema.description,
                            "parameters": schema.parameters_json(),
                        }
                    })
                })
                .collect();
            body["tools"] = serde_json::json!(definitions);
        }

        body
    }

    async fn send(&self, body: &serde_json::Value, model: &str) -> Result<Completion> {
        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AgentError::ModelUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => AgentError::ModelUnavailable(format!(
                    "credential rejected by provider ({})",
                    status
                )),
                429 => AgentError::ModelUnavailable(format!("rate limited by provider: {}", detail)),
                _ => AgentError::ModelUnavailable(format!("provider returned {}: {}", status, detail)),
            });
        }

        let raw: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))?;

        raw.into_completion(model)
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn health_check(&self) -> Result<bool> {
        let result = self
            .client
            .get(self.url("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;

        match result {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("Model endpoint health check failed: {}", e);
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
        let body = Self::build_body(messages, tools, options);
        tracing::debug!(model = %options.model, tools = tools.len(), "chat/completions request");
        self.send(&body, &options.model).await
    }
}

// Wire types for the chat-completions response

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl ChatResponse {
    fn into_completion(self, requested_model: &str) -> Result<Completion> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Parse("empty choices array".into()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|wire| ToolCall {
                name: wire.function.name,
                arguments: parse_arguments(&wire.function.arguments),
                id: wire.id,
            })
            .collect();

        let finish_reason = choice.finish_reason.as_deref().map(|reason| match reason {
            "length" => FinishReason::Length,
            "tool_calls" | "function_call" => FinishReason::ToolUse,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        });

        Ok(Completion {
            content: choice.message.content,
            tool_calls,
            model: self.model.unwrap_or_else(|| requested_model.to_string()),
            usage: self.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason,
        })
    }
}

/// Arguments arrive as a JSON string; a bare string is taken as the query
fn parse_arguments(raw: &str) -> HashMap<String, serde_json::Value> {
    match serde_json::from_str::<HashMap<String, serde_json::Value>>(raw) {
        Ok(arguments) => arguments,
        Err(_) if raw.trim().is_empty() => HashMap::new(),
        Err(_) => HashMap::from([(
            QUERY_PARAM.to_string(),
            serde_json::Value::String(raw.to_string()),
        )]),
    }
}
