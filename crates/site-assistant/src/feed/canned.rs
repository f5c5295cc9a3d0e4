//! Canned Update Feed
//!
//! Static answers for demos and tests. The query is ignored.

use async_trait::async_trait;

use super::{Topic, UpdateFeed};
use crate::error::Result;

pub const PRODUCT_UPDATES: &str = "The latest product updates include new features, improved performance, and enhanced user experience across various categories.";

pub const WEBSITE_UPDATES: &str = "The latest website updates include a new design, improved navigation, and enhanced content to provide a better user experience.";

pub const PAYMENT_UPDATES: &str = "The latest payment updates include new payment methods, enhanced security features, and improved transaction processing times.";

/// Feed that always returns the same text per topic
#[derive(Clone, Copy, Debug, Default)]
pub struct CannedUpdateFeed;

impl CannedUpdateFeed {
    pub fn new() -> Self {
        Self
    }

    fn text(topic: Topic) -> &'static str {
        match topic {
            Topic::Products => PRODUCT_UPDATES,
            Topic::Website => WEBSITE_UPDATES,
            Topic::Payments => PAYMENT_UPDATES,
        }
    }
}

#[async_trait]
impl UpdateFeed for CannedUpdateFeed {
    async fn latest(&self, topic: Topic, _query: &str) -> Result<String> {
        Ok(Self::text(topic).to_string())
    }

    fn name(&self) -> &str {
        "canned"
    }
}
