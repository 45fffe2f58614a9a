//! Conversions between our internal shapes and the OpenAI-compatible chat
//! completion wire format.

use serde_json::{json, Value};

use crate::capabilities::provider::CapabilityDescriptor;
use crate::intent::ForcingPolicy;
use crate::models::CapabilityOutput;

/// A fully assembled tool call, reconstructed from streamed fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl AssembledCall {
    /// The arguments as JSON. Models occasionally emit garbage here; an
    /// empty object lets the provider's own validation produce the error.
    pub fn arguments_json(&self) -> Value {
        serde_json::from_str(&self.arguments).unwrap_or_else(|_| json!({}))
    }
}

pub fn capabilities_to_tools(descriptors: &[CapabilityDescriptor]) -> Vec<Value> {
    descriptors
        .iter()
        .map(|descriptor| {
            json!({
                "type": "function",
                "function": {
                    "name": descriptor.name,
                    "description": descriptor.description,
                    "parameters": descriptor.input_schema,
                }
            })
        })
        .collect()
}

pub fn tool_choice(policy: ForcingPolicy) -> Value {
    match policy {
        ForcingPolicy::Auto => json!("auto"),
        ForcingPolicy::Required => json!("required"),
    }
}

/// The assistant turn that carried the tool calls, replayed into the
/// conversation before their results.
pub fn assistant_calls_message(calls: &[AssembledCall]) -> Value {
    let tool_calls: Vec<Value> = calls
        .iter()
        .map(|call| {
            json!({
                "id": call.id,
                "type": "function",
                "function": {
                    "name": call.name,
                    "arguments": call.arguments,
                }
            })
        })
        .collect();

    json!({
        "role": "assistant",
        "content": null,
        "tool_calls": tool_calls,
    })
}

pub fn tool_result_message(call: &AssembledCall, output: &CapabilityOutput) -> Value {
    json!({
        "role": "tool",
        "tool_call_id": call.id,
        "content": output.to_json().to_string(),
    })
}
