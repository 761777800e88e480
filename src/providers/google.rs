use serde_json::{json, Value};

use super::base::ContextBuilder;
use super::utils::{includable_messages, result_value};
use crate::models::conversation::ConversationData;
use crate::models::message::{ConversationMessage, Role};
use crate::models::tool::ToolCall;

/// Builder for the Google parts-based content API.
///
/// Assistant turns use the `model` role with `functionCall` parts; tool
/// results are `functionResponse` parts on a user turn. A thought
/// signature stored on a call is an opaque byte string: it is echoed
/// exactly on the part that carries the function call and never parsed
/// or validated. The parts contract has no system role, so a system
/// prompt is emitted as a leading user entry.
pub struct GoogleContextBuilder;

impl GoogleContextBuilder {
    fn function_call_part(call: &ToolCall) -> Value {
        let mut part = json!({
            "functionCall": {
                "name": call.name,
                "args": call.parameters,
            }
        });
        if let Some(signature) = &call.thought_signature {
            part["thoughtSignature"] = json!(signature);
        }
        part
    }

    fn function_response_part(call: &ToolCall, supplied: Option<&Value>) -> Value {
        let resolved = result_value(call, supplied);
        // The response slot wants an object; non-object output is
        // wrapped rather than rejected.
        let response = match resolved {
            Value::Object(map) => Value::Object(map),
            other => json!({ "result": other }),
        };
        json!({
            "functionResponse": {
                "name": call.name,
                "response": response,
            }
        })
    }

    fn text_entry(role: &str, text: &str) -> Value {
        json!({ "role": role, "parts": [{ "text": text }] })
    }

    fn message_to_spec(message: &ConversationMessage) -> Vec<Value> {
        match message.role {
            Role::User | Role::Tool => {
                vec![Self::text_entry("user", message.active_content())]
            }
            Role::Assistant => {
                let content = message.active_content();
                let calls = message.active_tool_calls();

                let mut parts = Vec::new();
                if !content.is_empty() {
                    parts.push(json!({ "text": content }));
                }
                parts.extend(calls.iter().map(Self::function_call_part));
                if parts.is_empty() {
                    parts.push(json!({ "text": "" }));
                }

                let mut output = vec![json!({ "role": "model", "parts": parts })];

                let responses: Vec<Value> = calls
                    .iter()
                    .filter(|call| call.resolved())
                    .map(|call| Self::function_response_part(call, None))
                    .collect();
                if !responses.is_empty() {
                    output.push(json!({ "role": "user", "parts": responses }));
                }
                output
            }
        }
    }
}

impl ContextBuilder for GoogleContextBuilder {
    fn build_context(
        &self,
        conversation: &ConversationData,
        system_prompt: Option<&str>,
    ) -> Vec<Value> {
        let mut spec = Vec::new();
        if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
            spec.push(Self::text_entry("user", system));
        }
        for message in includable_messages(conversation) {
            spec.extend(Self::message_to_spec(message));
        }
        spec
    }

    fn build_tool_continuation(
        &self,
        user_prompt: &str,
        tool_calls: &[ToolCall],
        tool_results: &[Value],
        previous_messages: Option<&[Value]>,
        system_prompt: Option<&str>,
    ) -> Vec<Value> {
        let previous = previous_messages.unwrap_or_default();
        let mut spec = Vec::new();

        if previous.is_empty() {
            if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
                spec.push(Self::text_entry("user", system));
            }
        }
        spec.extend(previous.iter().cloned());

        let duplicate = spec
            .last()
            .map(|m| m["role"] == "user" && m["parts"][0]["text"] == user_prompt)
            .unwrap_or(false);
        if !duplicate {
            spec.push(Self::text_entry("user", user_prompt));
        }

        self.append_tool_execution(tool_calls, tool_results, spec)
    }

    fn append_tool_execution(
        &self,
        tool_calls: &[ToolCall],
        tool_results: &[Value],
        mut previous_messages: Vec<Value>,
    ) -> Vec<Value> {
        let calls: Vec<Value> = tool_calls.iter().map(Self::function_call_part).collect();
        previous_messages.push(json!({ "role": "model", "parts": calls }));

        let responses: Vec<Value> = tool_calls
            .iter()
            .enumerate()
            .map(|(index, call)| Self::function_response_part(call, tool_results.get(index)))
            .collect();
        previous_messages.push(json!({ "role": "user", "parts": responses }));

        previous_messages
    }
}
