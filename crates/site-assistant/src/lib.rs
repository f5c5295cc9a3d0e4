//! # site-assistant
//!
//! Website chatbot built from one orchestrator and three specialists.
//!
//! ```text
//!                   ┌──────────────────────┐
//!   user message ──▶│   AI_Chatbot_Agent   │──▶ one reply
//!                   └──────────┬───────────┘
//!          ┌───────────────────┼─────────────────────┐
//!          ▼                   ▼                     ▼
//!   Products_Agent   Website_Overview_Agent    Payment_Agent
//!          │                   │                     │
//!  get_updated_products  get_updated_website  get_update_payment
//!          └───────────────────┴──────────┬──────────┘
//!                                     UpdateFeed
//! ```
//!
//! The orchestrator never calls a lookup tool directly; it delegates to the
//! specialist, which runs its own sub-turn and answers in plain text.

pub mod agents;
pub mod error;
pub mod feed;
pub mod svckit;

pub use agents::{build_orchestrator, Specialist, ORCHESTRATOR_NAME, SPECIALISTS};
pub use error::{AssistantError, Result};
pub use feed::{CannedUpdateFeed, Topic, UpdateFeed};

/// Greeting shown when a chat session opens
pub const WELCOME_MESSAGE: &str = "Welcome to the AI Chatbot Agent!";
