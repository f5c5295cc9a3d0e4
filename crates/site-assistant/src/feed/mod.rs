//! Update Feeds
//!
//! Where the specialist tools get their information from.

mod canned;

pub use canned::CannedUpdateFeed;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Subject area a specialist covers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Products,
    Website,
    Payments,
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::Products => write!(f, "products"),
            Topic::Website => write!(f, "website"),
            Topic::Payments => write!(f, "payments"),
        }
    }
}

/// Update feed trait (Strategy pattern)
///
/// Implement this for a real source (CMS, billing API, product catalog).
#[async_trait]
pub trait UpdateFeed: Send + Sync {
    /// Latest update text for `topic`, given the user's query
    async fn latest(&self, topic: Topic, query: &str) -> Result<String>;

    /// Feed name
    fn name(&self) -> &str;
}
