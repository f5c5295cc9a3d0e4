//! Prompt-level tool calling
//!
//! For backends without native function calling, tools are described in the
//! system prompt and the model asks for them with fenced blocks:
//!
//! ~~~text
//! ```tool
//! {"tool": "Payment_Agent", "arguments": {"query": "payment methods"}}
//! ```
//! ~~~
//!
//! Several blocks in one reply mean several calls, in order.

use std::collections::HashMap;

use agent_core::tool::{ToolCall, ToolSchema};
use serde::Deserialize;

const TOOL_FENCE: &str = "```tool";
const FENCE_END: &str = "```";

#[derive(Deserialize)]
struct WireCall {
    #[serde(alias = "name")]
    tool: String,
    #[serde(default)]
    arguments: HashMap<String, serde_json::Value>,
}

impl From<WireCall> for ToolCall {
    fn from(wire: WireCall) -> Self {
        ToolCall {
            name: wire.tool,
            arguments: wire.arguments,
            id: None,
        }
    }
}

/// System prompt section describing available tools
pub fn tools_prompt_section(tools: &[ToolSchema]) -> String {
    let mut prompt = String::from("## Available Tools\n\n");
    prompt.push_str("You can use the following tools by responding with a JSON block:\n\n");
    prompt.push_str("```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"query\": \"...\"}}\n```\n\n");
    prompt.push_str("After receiving tool results, synthesize them into a helpful response.\n");
    prompt.push_str("If you can answer directly without tools, do so.\n\n");

    for schema in tools {
        prompt.push_str(&format!("### {}\n", schema.name));
        prompt.push_str(&format!("{}\n", schema.description));

        if !schema.parameters.is_empty() {
            prompt.push_str("**Parameters:**\n");
            for param in &schema.parameters {
                let required = if param.required { " (required)" } else { "" };
                prompt.push_str(&format!(
                    "- `{}` ({}){}: {}\n",
                    param.name, param.param_type, required, param.description
                ));
            }
        }
        prompt.push('\n');
    }

    prompt
}

/// Render a call the way the model is asked to write it
pub fn render_tool_call(call: &ToolCall) -> String {
    let json = serde_json::json!({
        "tool": call.name,
        "arguments": call.arguments,
    });
    format!("{}\n{}\n{}", TOOL_FENCE, json, FENCE_END)
}

/// Split a reply into its prose and the tool calls it requests
pub fn parse_tool_calls(content: &str) -> (String, Vec<ToolCall>) {
    let mut calls = Vec::new();
    let mut prose = String::new();
    let mut rest = content;

    while let Some(start) = rest.find(TOOL_FENCE) {
        let after_marker = &rest[start + TOOL_FENCE.len()..];
        let Some(end) = after_marker.find(FENCE_END) else {
            break;
        };

        prose.push_str(&rest[..start]);
        let json_str = after_marker[..end].trim();
        match serde_json::from_str::<WireCall>(json_str) {
            Ok(wire) => calls.push(wire.into()),
            Err(e) => tracing::debug!(error = %e, "Ignoring malformed tool block"),
        }
        rest = &after_marker[end + FENCE_END.len()..];
    }
    prose.push_str(rest);

    if calls.is_empty() {
        if let Some(call) = parse_inline_tool_call(content) {
            return (String::new(), vec![call]);
        }
    }

    (prose.trim().to_string(), calls)
}

/// Fallback: a bare JSON object with a "tool" key
fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<WireCall>(&content[start..=end])
        .ok()
        .map(ToolCall::from)
}
