use serde_json::{json, Value};

use super::base::ContextBuilder;
use super::utils::{includable_messages, result_text};
use crate::models::conversation::ConversationData;
use crate::models::message::{ConversationMessage, Role};
use crate::models::tool::ToolCall;

/// Builder for the Anthropic messages API.
///
/// The array admits only user and assistant roles. Tool calls are
/// `tool_use` blocks inside the assistant content array; their results
/// come back as `tool_result` blocks on a following **user** turn, 1:1
/// by id. The system prompt never enters the array — the vendor carries
/// it as a top-level `system` field owned by the transport, so the
/// builder ignores it here.
pub struct AnthropicContextBuilder;

impl AnthropicContextBuilder {
    fn tool_use_block(call: &ToolCall) -> Value {
        json!({
            "type": "tool_use",
            "id": call.id,
            "name": call.name,
            "input": call.parameters,
        })
    }

    fn tool_result_block(call: &ToolCall, supplied: Option<&Value>) -> Value {
        json!({
            "type": "tool_result",
            "tool_use_id": call.id,
            "content": result_text(call, supplied),
        })
    }

    fn message_to_spec(message: &ConversationMessage) -> Vec<Value> {
        match message.role {
            Role::User | Role::Tool => vec![json!({
                "role": "user",
                "content": message.active_content(),
            })],
            Role::Assistant => {
                let content = message.active_content();
                let calls = message.active_tool_calls();

                if calls.is_empty() {
                    return vec![json!({ "role": "assistant", "content": content })];
                }

                let mut blocks = Vec::new();
                if !content.is_empty() {
                    blocks.push(json!({ "type": "text", "text": content }));
                }
                blocks.extend(calls.iter().map(Self::tool_use_block));

                let mut output = vec![json!({ "role": "assistant", "content": blocks })];

                let results: Vec<Value> = calls
                    .iter()
                    .filter(|call| call.resolved())
                    .map(|call| Self::tool_result_block(call, None))
                    .collect();
                if !results.is_empty() {
                    output.push(json!({ "role": "user", "content": results }));
                }
                output
            }
        }
    }
}

impl ContextBuilder for AnthropicContextBuilder {
    fn build_context(
        &self,
        conversation: &ConversationData,
        _system_prompt: Option<&str>,
    ) -> Vec<Value> {
        let mut spec = Vec::new();
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
        _system_prompt: Option<&str>,
    ) -> Vec<Value> {
        let mut spec: Vec<Value> = previous_messages.unwrap_or_default().to_vec();

        let duplicate = spec
            .last()
            .map(|m| m["role"] == "user" && m["content"] == user_prompt)
            .unwrap_or(false);
        if !duplicate {
            spec.push(json!({ "role": "user", "content": user_prompt }));
        }

        self.append_tool_execution(tool_calls, tool_results, spec)
    }

    fn append_tool_execution(
        &self,
        tool_calls: &[ToolCall],
        tool_results: &[Value],
        mut previous_messages: Vec<Value>,
    ) -> Vec<Value> {
        let uses: Vec<Value> = tool_calls.iter().map(Self::tool_use_block).collect();
        previous_messages.push(json!({ "role": "assistant", "content": uses }));

        let results: Vec<Value> = tool_calls
            .iter()
            .enumerate()
            .map(|(index, call)| Self::tool_result_block(call, tool_results.get(index)))
            .collect();
        previous_messages.push(json!({ "role": "user", "content": results }));

        previous_messages
    }
}
