//! Payment Updates Tool

use std::sync::Arc;
use async_trait::async_trait;

use agent_core::{
    RunContext, Tool, ToolCall, ToolResult, ToolSchema,
    Result as CoreResult,
};

use crate::feed::{Topic, UpdateFeed};

pub const TOOL_NAME: &str = "get_update_payment";

/// Looks up the latest payment updates
pub struct PaymentUpdatesTool {
    feed: Arc<dyn UpdateFeed>,
}

impl PaymentUpdatesTool {
    pub fn new(feed: Arc<dyn UpdateFeed>) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl Tool for PaymentUpdatesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::query_tool(
            TOOL_NAME,
            "Get the latest payment updates: payment methods, security and processing times.",
        )
    }

    async fn execute(&self, call: &ToolCall, _ctx: &RunContext) -> CoreResult<ToolResult> {
        super::lookup(self.feed.as_ref(), Topic::Payments, TOOL_NAME, call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AssistantError, Result};
    use agent_core::{AgentError, RunConfig};

    struct DownFeed;

    #[async_trait]
    impl UpdateFeed for DownFeed {
        async fn latest(&self, _topic: Topic, _query: &str) -> Result<String> {
            Err(AssistantError::FeedUnavailable {
                feed: "billing".into(),
                reason: "connection refused".into(),
            })
        }

        fn name(&self) -> &str {
            "billing"
        }
    }

    #[tokio::test]
    async fn test_feed_failure_is_tool_execution_error() {
        let tool = PaymentUpdatesTool::new(Arc::new(DownFeed));
        let ctx = RunContext::root(RunConfig::default());

        let err = tool
            .execute(&ToolCall::new(TOOL_NAME, "refunds"), &ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::ToolExecution(ref msg) if msg.contains("billing")));
    }
}
