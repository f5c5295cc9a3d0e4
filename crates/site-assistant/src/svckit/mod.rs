//! Service Kit - Agent Tools
//!
//! The lookup tools each specialist agent owns. All three read from an
//! [`UpdateFeed`] and differ only in topic.

mod product_updates;
mod website_updates;
mod payment_updates;

pub use product_updates::ProductUpdatesTool;
pub use website_updates::WebsiteUpdatesTool;
pub use payment_updates::PaymentUpdatesTool;

use agent_core::{Result as CoreResult, ToolCall, ToolResult};

use crate::feed::{Topic, UpdateFeed};

async fn lookup(
    feed: &dyn UpdateFeed,
    topic: Topic,
    tool: &str,
    call: &ToolCall,
) -> CoreResult<ToolResult> {
    let query = call.query().unwrap_or_default();
    tracing::info!(tool, %topic, feed = feed.name(), query, "Received query");

    let text = feed.latest(topic, query).await?;
    Ok(ToolResult::success(tool, text))
}
