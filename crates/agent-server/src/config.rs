//! Server Configuration
//!
//! Everything is read from the environment (after `.env` is loaded).
//! Malformed values are errors, never silent defaults.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use agent_core::{AgentError, Result, RunConfig, runner::DEFAULT_MAX_ROUNDS};

/// Default per-turn wall-clock budget
pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 60;

/// Which model backend to talk to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions (Gemini by default)
    OpenAi,
    /// Local Ollama
    Ollama,
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => agent_runtime::openai::DEFAULT_MODEL,
            ProviderKind::Ollama => "llama3.2",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gemini" => Ok(ProviderKind::OpenAi),
            "ollama" if cfg!(feature = "ollama") => Ok(ProviderKind::Ollama),
            "ollama" => Err(AgentError::Configuration(
                "MODEL_PROVIDER=ollama but the server was built without the `ollama` feature".into(),
            )),
            other => Err(AgentError::Configuration(format!(
                "MODEL_PROVIDER must be 'openai' or 'ollama', got '{}'",
                other
            ))),
        }
    }
}

/// Typed server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub provider: ProviderKind,

    /// Model identifier sent with every request
    pub model: String,

    pub max_rounds: usize,

    /// `None` when `TURN_TIMEOUT_SECS=0`
    pub turn_timeout: Option<Duration>,

    /// Per-turn summary events on the `agent_core::trace` target
    pub tracing: bool,

    pub bind_addr: String,

    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get("MODEL_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => ProviderKind::OpenAi,
        };

        let model = get("MODEL_NAME").unwrap_or_else(|| provider.default_model().into());

        let max_rounds = match get("MAX_TOOL_ROUNDS") {
            Some(raw) => match parse_number::<usize>("MAX_TOOL_ROUNDS", &raw)? {
                0 => {
                    return Err(AgentError::Configuration(
                        "MAX_TOOL_ROUNDS must be at least 1".into(),
                    ));
                }
                n => n,
            },
            None => DEFAULT_MAX_ROUNDS,
        };

        let timeout_secs = match get("TURN_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("TURN_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_TURN_TIMEOUT_SECS,
        };
        let turn_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let tracing = match get("AGENT_TRACING") {
            Some(raw) => parse_flag("AGENT_TRACING", &raw)?,
            None => false,
        };

        Ok(Self {
            provider,
            model,
            max_rounds,
            turn_timeout,
            tracing,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "static".into()).into(),
        })
    }

    /// Run settings shared by every turn
    pub fn run_config(&self) -> RunConfig {
        let mut config = RunConfig::default()
            .max_rounds(self.max_rounds)
            .tracing(self.tracing);
        if let Some(limit) = self.turn_timeout {
            config = config.turn_timeout(limit);
        }
        config
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        AgentError::Configuration(format!("{} must be a non-negative integer, got '{}'", key, raw))
    })
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AgentError::Configuration(format!(
            "{} must be true or false, got '{}'",
            key, raw
        ))),
    }
}
