//! Agent Roster
//!
//! Three specialists, each owning one lookup tool, and the orchestrator that
//! sees every specialist as a tool of its own.

use std::sync::Arc;

use agent_core::{Agent, ModelBinding, Result as CoreResult, Tool};

use crate::feed::{Topic, UpdateFeed};
use crate::svckit::{PaymentUpdatesTool, ProductUpdatesTool, WebsiteUpdatesTool};

pub const ORCHESTRATOR_NAME: &str = "AI_Chatbot_Agent";

pub const ORCHESTRATOR_INSTRUCTIONS: &str =
    "You are a helpful assistant of AI Chatbot. You have tools and agents to solve user queries.";

/// How one specialist is named, briefed and offered to the orchestrator
#[derive(Clone, Copy, Debug)]
pub struct Specialist {
    pub topic: Topic,
    /// Agent name, also the tool name the orchestrator sees
    pub name: &'static str,
    pub instructions: &'static str,
    /// Description the orchestrator's model reads when choosing a tool
    pub tool_description: &'static str,
}

pub const PRODUCTS: Specialist = Specialist {
    topic: Topic::Products,
    name: "Products_Agent",
    instructions: "You are a specialized agent for product-related all queries. You can provide information about products, their features, price of each product and specifications.",
    tool_description: "You are a specialized agent for product-related queries. You can provide information about products, their features, price of each product and specifications.",
};

pub const WEBSITE: Specialist = Specialist {
    topic: Topic::Website,
    name: "Website_Overview_Agent",
    instructions: "You are a specialized agent for website overview queries. You can provide all website information, all overview and details.",
    tool_description: "You are a specialized agent for website overview queries. You can provide all website information, all overview and details.",
};

pub const PAYMENT: Specialist = Specialist {
    topic: Topic::Payments,
    name: "Payment_Agent",
    instructions: "You are a specialized agent for payment-related queries. You can provide information about payment methods, payment status, and any payment-related issues.",
    tool_description: "You are a specialized agent for payment-related queries. You can provide information about payment methods, payment status, and any payment-related issues.",
};

/// Orchestrator tool order
pub const SPECIALISTS: [Specialist; 3] = [PRODUCTS, WEBSITE, PAYMENT];

impl Specialist {
    fn lookup_tool(&self, feed: Arc<dyn UpdateFeed>) -> Arc<dyn Tool> {
        match self.topic {
            Topic::Products => Arc::new(ProductUpdatesTool::new(feed)),
            Topic::Website => Arc::new(WebsiteUpdatesTool::new(feed)),
            Topic::Payments => Arc::new(PaymentUpdatesTool::new(feed)),
        }
    }

    /// Build this specialist with its lookup tool
    pub fn build(&self, feed: Arc<dyn UpdateFeed>, model: ModelBinding) -> CoreResult<Agent> {
        Agent::builder(self.name)
            .instructions(self.instructions)
            .tool_arc(self.lookup_tool(feed))
            .model(model)
            .build()
    }
}

/// Build the orchestrator with every specialist attached as a tool
///
/// All agents share `model`; a per-run override in `RunConfig` still wins.
pub fn build_orchestrator(feed: Arc<dyn UpdateFeed>, model: ModelBinding) -> CoreResult<Agent> {
    let mut builder = Agent::builder(ORCHESTRATOR_NAME)
        .instructions(ORCHESTRATOR_INSTRUCTIONS)
        .model(model.clone());

    for specialist in &SPECIALISTS {
        let agent = Arc::new(specialist.build(Arc::clone(&feed), model.clone())?);
        tracing::debug!(specialist = specialist.name, "Attaching specialist");
        builder = builder.tool(agent.as_tool(specialist.name, specialist.tool_description));
    }

    builder.build()
}
