//! Website Updates Tool

use std::sync::Arc;
use async_trait::async_trait;

use agent_core::{
    RunContext, Tool, ToolCall, ToolResult, ToolSchema,
    Result as CoreResult,
};

use crate::feed::{Topic, UpdateFeed};

pub const TOOL_NAME: &str = "get_updated_website";

/// Looks up the latest website updates
pub struct WebsiteUpdatesTool {
    feed: Arc<dyn UpdateFeed>,
}

impl WebsiteUpdatesTool {
    pub fn new(feed: Arc<dyn UpdateFeed>) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl Tool for WebsiteUpdatesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::query_tool(
            TOOL_NAME,
            "Get the latest website updates: design, navigation and content changes.",
        )
    }

    async fn execute(&self, call: &ToolCall, _ctx: &RunContext) -> CoreResult<ToolResult> {
        super::lookup(self.feed.as_ref(), Topic::Website, TOOL_NAME, call).await
    }
}
