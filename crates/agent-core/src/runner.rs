//! Turn Runner
//!
//! Executes one orchestration turn. Each round the bound model sees the
//! agent's instructions, the conversation so far and a descriptor for every
//! registered tool, then either answers or asks for tool calls. Requested
//! calls are executed (concurrently by default), their results are appended
//! in declaration order, and the model is asked again.
//!
//! ```text
//! AWAITING_MODEL_DECISION ──no tools──▶ PRODUCING_FINAL_OUTPUT ──▶ DONE
//!        ▲        │
//!        │        └──N tools──▶ EXECUTING_TOOLS(N)
//!        └──────────results appended─────┘
//! ```
//!
//! Rounds are capped by [`RunConfig::max_rounds`] and the whole turn by
//! [`RunConfig::turn_timeout`]; both surface as [`AgentError::TurnTimeout`].
//! A failing tool never aborts the turn: its error text goes back to the
//! model as the tool result.

use std::time::Duration;

use futures::future::join_all;

use crate::agent::Agent;
use crate::error::{AgentError, Result, TurnLimit};
use crate::message::{Conversation, Message};
use crate::provider::{Decision, FinishReason, ModelBinding};
use crate::tool::{ToolCall, ToolRegistry, ToolResult};
use crate::turn::{Turn, TurnState};

/// Rounds allowed per turn unless configured otherwise
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Process-wide, read-only run settings
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Overrides every agent's own binding for the turn, nested runs included
    pub model: Option<ModelBinding>,

    /// Maximum model decisions per (sub-)turn
    pub max_rounds: usize,

    /// Wall-clock budget for a whole top-level turn
    pub turn_timeout: Option<Duration>,

    /// Run the tool calls of one round concurrently
    pub parallel_tool_calls: bool,

    /// Emit a per-turn summary event on the `agent_core::trace` target
    pub tracing: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            turn_timeout: None,
            parallel_tool_calls: true,
            tracing: false,
        }
    }
}

impl RunConfig {
    pub fn with_model(mut self, model: ModelBinding) -> Self {
        self.model = Some(model);
        self
    }

    pub fn max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds.max(1);
        self
    }

    pub fn turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = Some(timeout);
        self
    }

    pub fn sequential_tool_calls(mut self) -> Self {
        self.parallel_tool_calls = false;
        self
    }

    pub fn tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }
}

/// Per-call context threaded through tool execution
#[derive(Clone, Debug)]
pub struct RunContext {
    config: RunConfig,
    depth: usize,
}

impl RunContext {
    /// Context for a top-level turn
    pub fn root(config: RunConfig) -> Self {
        Self { config, depth: 0 }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Delegation depth (0 for the agent facing the user)
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn nested(&self) -> Self {
        Self {
            config: self.config.clone(),
            depth: self.depth + 1,
        }
    }
}

/// Outcome of a completed turn
#[derive(Clone, Debug)]
pub struct RunResult {
    /// The single message to send back
    pub final_output: String,

    pub turn: Turn,
}

/// Executes turns against an agent
pub struct Runner;

impl Runner {
    /// Run one turn of `agent` on `input`
    pub async fn run(agent: &Agent, input: &str, config: &RunConfig) -> Result<RunResult> {
        let ctx = RunContext::root(config.clone());
        let turn = Self::execute_turn(agent, input, &ctx);

        let outcome = match config.turn_timeout {
            Some(limit) => match tokio::time::timeout(limit, turn).await {
                Ok(outcome) => outcome,
                Err(_) => Err(AgentError::TurnTimeout(TurnLimit::Elapsed(limit))),
            },
            None => turn.await,
        };

        match &outcome {
            Ok(result) => {
                tracing::debug!(
                    agent = %agent.name(),
                    rounds = result.turn.rounds,
                    tools = result.turn.invocations.len(),
                    "Turn complete"
                );
                if config.tracing {
                    tracing::info!(
                        target: "agent_core::trace",
                        turn = %result.turn.id,
                        agent = %agent.name(),
                        rounds = result.turn.rounds,
                        tools = ?result.turn.tool_names(),
                        duration_ms = result.turn.duration().map(|d| d.num_milliseconds()),
                        "turn"
                    );
                }
            }
            Err(e) => tracing::warn!(agent = %agent.name(), error = %e, "Turn failed"),
        }

        outcome
    }

    /// Run a delegated agent to completion inside an outer turn
    pub(crate) async fn run_nested(
        agent: &Agent,
        input: &str,
        parent: &RunContext,
    ) -> Result<RunResult> {
        Self::execute_turn(agent, input, &parent.nested()).await
    }

    async fn execute_turn(agent: &Agent, input: &str, ctx: &RunContext) -> Result<RunResult> {
        let config = ctx.config();
        let binding = config.model.as_ref().unwrap_or_else(|| agent.model());
        let schemas = agent.tools().schemas();

        let mut turn = Turn::new(agent.name(), input);
        let mut conversation = Conversation::with_system_prompt(agent.instructions());
        conversation.push(Message::user(input));

        for round in 1..=config.max_rounds {
            turn.rounds = round;
            turn.transition(TurnState::AwaitingModelDecision);

            let completion = binding
                .provider
                .complete(conversation.messages(), &schemas, &binding.options)
                .await
                .map_err(|e| match e {
                    AgentError::ModelUnavailable(_) => e,
                    other => AgentError::ModelUnavailable(other.to_string()),
                })?;

            let calls = match completion.decision() {
                Decision::Respond(text) => {
                    if text.trim().is_empty()
                        && matches!(
                            completion.finish_reason,
                            Some(FinishReason::ContentFilter | FinishReason::Error)
                        )
                    {
                        return Err(AgentError::ModelUnavailable(format!(
                            "model returned no answer (finish reason {:?})",
                            completion.finish_reason
                        )));
                    }
                    turn.transition(TurnState::ProducingFinalOutput);
                    turn.finish();
                    return Ok(RunResult {
                        final_output: text,
                        turn,
                    });
                }
                Decision::CallTools(calls) => calls,
            };

            let calls: Vec<ToolCall> = calls
                .into_iter()
                .map(|mut call| {
                    if call.id.as_deref().is_none_or(str::is_empty) {
                        call.id = Some(uuid::Uuid::new_v4().to_string());
                    }
                    call
                })
                .collect();

            turn.transition(TurnState::ExecutingTools(calls.len()));
            conversation.push(Message::assistant_tool_calls(
                completion.content.unwrap_or_default(),
                calls.clone(),
            ));

            let results = Self::execute_tools(agent.tools(), &calls, ctx).await;
            for (call, result) in calls.iter().zip(results) {
                turn.record(round, call, &result);
                conversation.push(
                    Message::tool(Self::format_tool_result(&result), call.id.clone())
                        .with_name(&call.name),
                );
            }
        }

        Err(AgentError::TurnTimeout(TurnLimit::Rounds(config.max_rounds)))
    }

    /// Results come back in declaration order however execution interleaves
    async fn execute_tools(
        tools: &ToolRegistry,
        calls: &[ToolCall],
        ctx: &RunContext,
    ) -> Vec<ToolResult> {
        if ctx.config().parallel_tool_calls {
            join_all(calls.iter().map(|call| Self::execute_tool(tools, call, ctx))).await
        } else {
            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                results.push(Self::execute_tool(tools, call, ctx).await);
            }
            results
        }
    }

    async fn execute_tool(tools: &ToolRegistry, call: &ToolCall, ctx: &RunContext) -> ToolResult {
        tracing::debug!(tool = %call.name, depth = ctx.depth(), "Executing tool");

        match tools.execute(call, ctx).await {
            Ok(mut result) => {
                result.id = call.id.clone();
                result
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool failed");
                let failure = ToolResult::failure(&call.name, format!("Error: {}", e));
                match &call.id {
                    Some(id) => failure.with_id(id),
                    None => failure,
                }
            }
        }
    }

    /// Format tool result for conversation
    fn format_tool_result(result: &ToolResult) -> String {
        if result.success {
            format!("[Tool '{}' returned]\n{}", result.name, result.output)
        } else {
            format!("[Tool '{}' failed]\n{}", result.name, result.output)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::message::Role;
    use crate::provider::{Completion, GenerationOptions, LlmProvider};
    use crate::testing::ScriptedProvider;
    use crate::tool::{FunctionTool, Tool, ToolSchema};

    fn binding(provider: &Arc<ScriptedProvider>) -> ModelBinding {
        let provider: Arc<dyn LlmProvider> = provider.clone();
        ModelBinding::new(provider, GenerationOptions::for_model("scripted"))
    }

    fn counting_tool(name: &str, hits: Arc<AtomicUsize>) -> Arc<dyn Tool> {
        let output = format!("{} result", name);
        Arc::new(FunctionTool::new(name, "counts calls", move |_q: &str| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(output.clone())
        }))
    }

    /// Sleeps before answering and logs when it finished
    struct DelayedTool {
        name: String,
        delay: Duration,
        finished: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Tool for DelayedTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema::query_tool(&self.name, "slow or fast")
        }

        async fn execute(&self, call: &ToolCall, _ctx: &RunContext) -> Result<ToolResult> {
            tokio::time::sleep(self.delay).await;
            self.finished.lock().unwrap().push(self.name.clone());
            Ok(ToolResult::success(&self.name, format!("{} saw {}", self.name, call.query().unwrap_or_default())))
        }
    }

    fn tool_messages(messages: &[Message]) -> Vec<&Message> {
        messages.iter().filter(|m| m.role == Role::Tool).collect()
    }

    #[tokio::test]
    async fn test_direct_answer_records_no_tools() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(Completion::text("Hello!"))]));
        let hits = Arc::new(AtomicUsize::new(0));
        let agent = Agent::builder("Chatbot")
            .instructions("Be helpful.")
            .tool_arc(counting_tool("lookup", hits.clone()))
            .model(binding(&provider))
            .build()
            .unwrap();

        let result = Runner::run(&agent, "hi", &RunConfig::default()).await.unwrap();

        assert_eq!(result.final_output, "Hello!");
        assert!(result.turn.invocations.is_empty());
        assert_eq!(result.turn.rounds, 1);
        assert_eq!(result.turn.state, TurnState::Done);
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "Be helpful.");
        assert_eq!(request.messages[1].content, "hi");
        assert_eq!(request.tools, vec!["lookup"]);
    }

    #[tokio::test]
    async fn test_each_call_invokes_its_tool_once() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![
                ToolCall::new("alpha", "one"),
                ToolCall::new("beta", "two"),
                ToolCall::new("alpha", "three"),
            ])),
            Ok(Completion::text("done")),
        ]));
        let alpha = Arc::new(AtomicUsize::new(0));
        let beta = Arc::new(AtomicUsize::new(0));
        let agent = Agent::builder("Chatbot")
            .tool_arc(counting_tool("alpha", alpha.clone()))
            .tool_arc(counting_tool("beta", beta.clone()))
            .model(binding(&provider))
            .build()
            .unwrap();

        let result = Runner::run(&agent, "go", &RunConfig::default()).await.unwrap();

        assert_eq!(alpha.load(Ordering::SeqCst), 2);
        assert_eq!(beta.load(Ordering::SeqCst), 1);
        assert_eq!(result.turn.tool_names(), vec!["alpha", "beta", "alpha"]);
        assert_eq!(result.turn.rounds, 2);
    }

    #[tokio::test]
    async fn test_results_keep_declaration_order_when_concurrent() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![
                ToolCall::new("slow", "a"),
                ToolCall::new("fast", "b"),
            ])),
            Ok(Completion::text("both done")),
        ]));
        let finished = Arc::new(Mutex::new(Vec::new()));
        let agent = Agent::builder("Chatbot")
            .tool(DelayedTool {
                name: "slow".into(),
                delay: Duration::from_millis(80),
                finished: finished.clone(),
            })
            .tool(DelayedTool {
                name: "fast".into(),
                delay: Duration::from_millis(1),
                finished: finished.clone(),
            })
            .model(binding(&provider))
            .build()
            .unwrap();

        Runner::run(&agent, "go", &RunConfig::default()).await.unwrap();

        assert_eq!(*finished.lock().unwrap(), vec!["fast", "slow"]);

        let follow_up = &provider.requests()[1];
        let tools = tool_messages(&follow_up.messages);
        assert_eq!(tools.len(), 2);
        assert!(tools[0].content.contains("slow saw a"));
        assert!(tools[1].content.contains("fast saw b"));

        let assistant = follow_up
            .messages
            .iter()
            .find(|m| m.role == Role::Assistant)
            .unwrap();
        assert_eq!(tools[0].tool_call_id, assistant.tool_calls[0].id);
        assert_eq!(tools[1].tool_call_id, assistant.tool_calls[1].id);
    }

    #[tokio::test]
    async fn test_sequential_mode_runs_in_order() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![
                ToolCall::new("slow", "a"),
                ToolCall::new("fast", "b"),
            ])),
            Ok(Completion::text("done")),
        ]));
        let finished = Arc::new(Mutex::new(Vec::new()));
        let agent = Agent::builder("Chatbot")
            .tool(DelayedTool {
                name: "slow".into(),
                delay: Duration::from_millis(20),
                finished: finished.clone(),
            })
            .tool(DelayedTool {
                name: "fast".into(),
                delay: Duration::from_millis(1),
                finished: finished.clone(),
            })
            .model(binding(&provider))
            .build()
            .unwrap();

        let config = RunConfig::default().sequential_tool_calls();
        Runner::run(&agent, "go", &config).await.unwrap();

        assert_eq!(*finished.lock().unwrap(), vec!["slow", "fast"]);
    }

    #[tokio::test]
    async fn test_failing_tool_does_not_abort_turn() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![ToolCall::new("flaky", "status")])),
            Ok(Completion::text("Sorry, that lookup failed.")),
        ]));
        let agent = Agent::builder("Chatbot")
            .tool(FunctionTool::new("flaky", "always fails", |_q: &str| {
                Err(AgentError::ToolExecution("upstream data source unavailable".into()))
            }))
            .model(binding(&provider))
            .build()
            .unwrap();

        let result = Runner::run(&agent, "status?", &RunConfig::default()).await.unwrap();

        assert_eq!(result.final_output, "Sorry, that lookup failed.");
        assert!(!result.turn.invocations[0].success);

        let follow_up = &provider.requests()[1];
        let tools = tool_messages(&follow_up.messages);
        assert!(tools[0].content.contains("[Tool 'flaky' failed]"));
        assert!(tools[0].content.contains("upstream data source unavailable"));
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_notice() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![ToolCall::new("Refund_Agent", "refund")])),
            Ok(Completion::text("I can't do refunds.")),
        ]));
        let agent = Agent::builder("Chatbot")
            .model(binding(&provider))
            .build()
            .unwrap();

        let result = Runner::run(&agent, "refund me", &RunConfig::default()).await.unwrap();

        assert_eq!(result.final_output, "I can't do refunds.");
        let follow_up = &provider.requests()[1];
        assert!(tool_messages(&follow_up.messages)[0]
            .content
            .contains("Tool not found: Refund_Agent"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_model_unavailable() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(AgentError::Parse(
            "garbled body".into(),
        ))]));
        let agent = Agent::builder("Chatbot")
            .model(binding(&provider))
            .build()
            .unwrap();

        let err = Runner::run(&agent, "hi", &RunConfig::default()).await.unwrap_err();

        assert!(matches!(err, AgentError::ModelUnavailable(ref msg) if msg.contains("garbled body")));
    }

    #[tokio::test]
    async fn test_blank_call_ids_are_replaced() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![
                ToolCall::new("lookup", "a").with_id(""),
                ToolCall::new("lookup", "b").with_id(""),
            ])),
            Ok(Completion::text("done")),
        ]));
        let agent = Agent::builder("Chatbot")
            .tool_arc(counting_tool("lookup", Arc::new(AtomicUsize::new(0))))
            .model(binding(&provider))
            .build()
            .unwrap();

        Runner::run(&agent, "both", &RunConfig::default()).await.unwrap();

        let follow_up = &provider.requests()[1];
        let tools = tool_messages(&follow_up.messages);
        let ids: Vec<&str> = tools
            .iter()
            .map(|m| m.tool_call_id.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.iter().all(|id| !id.is_empty()));
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn test_filtered_empty_answer_is_model_unavailable() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(Completion {
            content: None,
            finish_reason: Some(FinishReason::ContentFilter),
            ..Default::default()
        })]));
        let agent = Agent::builder("Chatbot")
            .model(binding(&provider))
            .build()
            .unwrap();

        let err = Runner::run(&agent, "hi", &RunConfig::default()).await.unwrap_err();

        assert!(matches!(err, AgentError::ModelUnavailable(ref msg) if msg.contains("ContentFilter")));
    }

    #[tokio::test]
    async fn test_specialist_model_failure_does_not_abort_outer_turn() {
        let specialist_model = Arc::new(ScriptedProvider::new(vec![Err(
            AgentError::ModelUnavailable("503 from upstream".into()),
        )]));
        let specialist = Arc::new(
            Agent::builder("Website_Overview_Agent")
                .model(binding(&specialist_model))
                .build()
                .unwrap(),
        );

        let orchestrator_model = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![ToolCall::new("Website_Overview_Agent", "news")])),
            Ok(Completion::text("The website team is unreachable right now.")),
        ]));
        let orchestrator = Agent::builder("AI_Chatbot_Agent")
            .tool(specialist.as_tool("Website_Overview_Agent", "Website questions"))
            .model(binding(&orchestrator_model))
            .build()
            .unwrap();

        let result = Runner::run(&orchestrator, "What changed?", &RunConfig::default())
            .await
            .unwrap();

        assert_eq!(result.final_output, "The website team is unreachable right now.");
        assert!(!result.turn.invocations[0].success);

        let follow_up = &orchestrator_model.requests()[1];
        let tools = tool_messages(&follow_up.messages);
        let notice = &tools[0].content;
        assert!(notice.contains("[Tool 'Website_Overview_Agent' failed]"));
        assert!(notice.contains("503 from upstream"));
    }

    #[tokio::test]
    async fn test_round_budget_stops_endless_delegation() {
        let provider = Arc::new(ScriptedProvider::repeating(Completion::tool_calls(vec![
            ToolCall::new("lookup", "again"),
        ])));
        let hits = Arc::new(AtomicUsize::new(0));
        let agent = Agent::builder("Chatbot")
            .tool_arc(counting_tool("lookup", hits.clone()))
            .model(binding(&provider))
            .build()
            .unwrap();

        let config = RunConfig::default().max_rounds(5);
        let err = Runner::run(&agent, "loop", &config).await.unwrap_err();

        assert!(matches!(err, AgentError::TurnTimeout(TurnLimit::Rounds(5))));
        assert_eq!(provider.call_count(), 5);
        assert_eq!(hits.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_turn_timeout_elapsed() {
        let provider = Arc::new(
            ScriptedProvider::new(vec![Ok(Completion::text("too late"))])
                .with_delay(Duration::from_millis(500)),
        );
        let agent = Agent::builder("Chatbot")
            .model(binding(&provider))
            .build()
            .unwrap();

        let config = RunConfig::default().turn_timeout(Duration::from_millis(20));
        let err = Runner::run(&agent, "hi", &config).await.unwrap_err();

        assert!(matches!(err, AgentError::TurnTimeout(TurnLimit::Elapsed(_))));
    }

    #[tokio::test]
    async fn test_delegation_folds_specialist_answer() {
        let specialist_model = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![ToolCall::new("get_update_payment", "methods")])),
            Ok(Completion::text("We accept cards and wallets.")),
        ]));
        let specialist = Arc::new(
            Agent::builder("Payment_Agent")
                .instructions("Payments only.")
                .tool(FunctionTool::new("get_update_payment", "payment news", |_q: &str| {
                    Ok("new payment methods".to_string())
                }))
                .model(binding(&specialist_model))
                .build()
                .unwrap(),
        );

        let orchestrator_model = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![ToolCall::new("Payment_Agent", "payment methods")])),
            Ok(Completion::text("You can pay with cards and wallets.")),
        ]));
        let orchestrator = Agent::builder("AI_Chatbot_Agent")
            .tool(specialist.as_tool("Payment_Agent", "Payment questions"))
            .model(binding(&orchestrator_model))
            .build()
            .unwrap();

        let result = Runner::run(&orchestrator, "How can I pay?", &RunConfig::default())
            .await
            .unwrap();

        assert_eq!(result.final_output, "You can pay with cards and wallets.");
        assert_eq!(result.turn.invocations[0].query, "payment methods");
        assert_eq!(result.turn.invocations[0].output, "We accept cards and wallets.");

        // the specialist saw only the delegated query, under its own instructions
        let nested = &specialist_model.requests()[0];
        assert_eq!(nested.messages[0].content, "Payments only.");
        assert_eq!(nested.messages[1].content, "payment methods");
    }

    #[tokio::test]
    async fn test_config_model_overrides_agent_binding() {
        let own = Arc::new(ScriptedProvider::new(vec![Ok(Completion::text("own"))]));
        let shared = Arc::new(ScriptedProvider::new(vec![Ok(Completion::text("shared"))]));
        let agent = Agent::builder("Chatbot")
            .model(binding(&own))
            .build()
            .unwrap();

        let config = RunConfig::default().with_model(binding(&shared));
        let result = Runner::run(&agent, "hi", &config).await.unwrap();

        assert_eq!(result.final_output, "shared");
        assert_eq!(own.call_count(), 0);
    }
}
