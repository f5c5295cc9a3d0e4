//! Agents
//!
//! An [`Agent`] is a named bundle of instructions, an ordered tool set and a
//! model binding. Agents are built once and never mutated; every per-turn
//! value lives in the [`Runner`] call.
//!
//! Any agent can be handed to another agent as a tool via
//! [`Agent::as_tool`]. The resulting [`AgentTool`] runs the wrapped agent to
//! completion on the query it receives and returns the final output as the
//! tool result.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::provider::ModelBinding;
use crate::runner::{RunConfig, RunContext, Runner};
use crate::tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};

/// A conversational agent
pub struct Agent {
    name: String,
    instructions: String,
    tools: ToolRegistry,
    model: ModelBinding,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("tools", &self.tools)
            .field("model", &self.model)
            .finish()
    }
}

impl Agent {
    /// Start building an agent
    pub fn builder(name: impl Into<String>) -> AgentBuilder {
        AgentBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// System-level guidance given to the model
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> &ModelBinding {
        &self.model
    }

    /// Run this agent directly on a query and return its final output
    pub async fn ask(&self, input: &str, config: &RunConfig) -> Result<String> {
        Runner::run(self, input, config)
            .await
            .map(|result| result.final_output)
    }

    /// Expose this agent to a parent agent as a tool
    ///
    /// `tool_name` and `tool_description` are what the parent's model sees;
    /// they may differ from this agent's own name and instructions.
    pub fn as_tool(
        self: &Arc<Self>,
        tool_name: impl Into<String>,
        tool_description: impl Into<String>,
    ) -> AgentTool {
        AgentTool {
            agent: Arc::clone(self),
            name: tool_name.into(),
            description: tool_description.into(),
        }
    }
}

/// Tool adapter that delegates to a nested agent
pub struct AgentTool {
    agent: Arc<Agent>,
    name: String,
    description: String,
}

#[async_trait]
impl Tool for AgentTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: vec![ParameterSchema::query(
                "The request to hand to this specialist, in plain language",
            )],
        }
    }

    async fn execute(&self, call: &ToolCall, ctx: &RunContext) -> Result<ToolResult> {
        let query = call.query().unwrap_or_default();
        tracing::debug!(
            tool = %self.name,
            agent = %self.agent.name(),
            depth = ctx.depth() + 1,
            "Delegating to nested agent"
        );

        let result = Runner::run_nested(&self.agent, query, ctx).await?;
        Ok(ToolResult::success(&self.name, result.final_output))
    }

    fn delegate(&self) -> Option<&Agent> {
        Some(&self.agent)
    }
}

/// Builder for [`Agent`]
pub struct AgentBuilder {
    name: String,
    instructions: String,
    tools: Vec<Arc<dyn Tool>>,
    model: Option<ModelBinding>,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: String::new(),
            tools: Vec::new(),
            model: None,
        }
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn tool_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn model(mut self, model: ModelBinding) -> Self {
        self.model = Some(model);
        self
    }

    /// Validate and build
    ///
    /// Fails with [`AgentError::Configuration`] when the name is empty, no
    /// model is bound, two tools share a name, or the agent would reach
    /// itself through its own agent-as-tool graph.
    pub fn build(self) -> Result<Agent> {
        if self.name.trim().is_empty() {
            return Err(AgentError::Configuration("agent name must not be empty".into()));
        }

        let model = self.model.ok_or_else(|| {
            AgentError::Configuration(format!("agent '{}' has no model binding", self.name))
        })?;

        let mut tools = ToolRegistry::new();
        for tool in self.tools {
            tools.register_arc(tool).map_err(|e| match e {
                AgentError::Configuration(msg) => {
                    AgentError::Configuration(format!("agent '{}': {}", self.name, msg))
                }
                other => other,
            })?;
        }

        let mut path = vec![self.name.clone()];
        ensure_acyclic(&self.name, &tools, &mut path)?;

        Ok(Agent {
            name: self.name,
            instructions: self.instructions,
            tools,
            model,
        })
    }
}

/// Walk the delegation graph below `tools`, failing if `root` shows up
fn ensure_acyclic(root: &str, tools: &ToolRegistry, path: &mut Vec<String>) -> Result<()> {
    for tool in tools.iter() {
        let Some(agent) = tool.delegate() else {
            continue;
        };

        path.push(agent.name().to_string());
        if agent.name() == root {
            return Err(AgentError::Configuration(format!(
                "agent '{}' delegates to itself: {}",
                root,
                path.join(" -> ")
            )));
        }
        ensure_acyclic(root, agent.tools(), path)?;
        path.pop();
    }

    Ok(())
}
