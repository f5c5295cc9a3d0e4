//! Product Updates Tool

use std::sync::Arc;
use async_trait::async_trait;

use agent_core::{
    RunContext, Tool, ToolCall, ToolResult, ToolSchema,
    Result as CoreResult,
};

use crate::feed::{Topic, UpdateFeed};

pub const TOOL_NAME: &str = "get_updated_products";

/// Looks up the latest product updates
pub struct ProductUpdatesTool {
    feed: Arc<dyn UpdateFeed>,
}

impl ProductUpdatesTool {
    pub fn new(feed: Arc<dyn UpdateFeed>) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl Tool for ProductUpdatesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::query_tool(
            TOOL_NAME,
            "Get the latest product updates: new features, pricing, specifications and categories.",
        )
    }

    async fn execute(&self, call: &ToolCall, _ctx: &RunContext) -> CoreResult<ToolResult> {
        super::lookup(self.feed.as_ref(), Topic::Products, TOOL_NAME, call).await
    }
}
