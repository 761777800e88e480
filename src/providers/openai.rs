use serde_json::{json, Value};

use super::base::ContextBuilder;
use super::utils::{includable_messages, result_text, sanitize_function_name, value_text};
use crate::models::conversation::ConversationData;
use crate::models::message::{ConversationMessage, Role};
use crate::models::tool::ToolCall;

/// Builder for OpenAI-compatible chat completion APIs.
///
/// Tool calls ride on the assistant turn as a `tool_calls` array with
/// stringified JSON arguments; each result is a dedicated `role:tool`
/// message back-referencing the call id.
pub struct OpenAiContextBuilder;

impl OpenAiContextBuilder {
    fn tool_call_json(call: &ToolCall) -> Value {
        json!({
            "id": call.id,
            "type": "function",
            "function": {
                "name": sanitize_function_name(&call.name),
                "arguments": value_text(&call.parameters),
            }
        })
    }

    /// Map one stored message to its wire entries: the turn itself,
    /// followed by a `role:tool` entry per resolved call.
    ///
    /// A standalone stored tool message carries no originating call id,
    /// so its entry is emitted without `tool_call_id` — a degraded
    /// shape, like string pass-through for unparsable arguments. Tool
    /// results produced through the normal call flow always carry the
    /// id.
    fn message_to_spec(message: &ConversationMessage) -> Vec<Value> {
        match message.role {
            Role::User => vec![json!({
                "role": "user",
                "content": message.active_content(),
            })],
            Role::Tool => {
                tracing::debug!(
                    message = %message.id,
                    "standalone tool message has no call id, emitting without tool_call_id"
                );
                vec![json!({
                    "role": "tool",
                    "content": message.active_content(),
                })]
            }
            Role::Assistant => {
                let mut entry = json!({ "role": "assistant" });
                let content = message.active_content();
                if !content.is_empty() {
                    entry["content"] = json!(content);
                }

                let calls = message.active_tool_calls();
                if !calls.is_empty() {
                    entry["tool_calls"] =
                        Value::Array(calls.iter().map(Self::tool_call_json).collect());
                }

                let mut output = vec![entry];
                for call in calls.iter().filter(|call| call.resolved()) {
                    output.push(json!({
                        "role": "tool",
                        "tool_call_id": call.id,
                        "content": result_text(call, None),
                    }));
                }
                output
            }
        }
    }
}

impl ContextBuilder for OpenAiContextBuilder {
    fn build_context(
        &self,
        conversation: &ConversationData,
        system_prompt: Option<&str>,
    ) -> Vec<Value> {
        let mut spec = Vec::new();
        if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
            spec.push(json!({ "role": "system", "content": system }));
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

        let has_system = previous.first().map(|m| m["role"] == "system").unwrap_or(false);
        if !has_system {
            if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
                spec.push(json!({ "role": "system", "content": system }));
            }
        }
        spec.extend(previous.iter().cloned());

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
        let mut invocation = json!({ "role": "assistant" });
        invocation["tool_calls"] =
            Value::Array(tool_calls.iter().map(Self::tool_call_json).collect());
        previous_messages.push(invocation);

        // One round is one invocation plus one result entry. With
        // several calls in the round, the entry back-references the
        // first id and joins the outputs.
        let outputs: Vec<String> = tool_calls
            .iter()
            .enumerate()
            .map(|(index, call)| result_text(call, tool_results.get(index)))
            .collect();
        let call_id = tool_calls.first().map(|call| call.id.as_str()).unwrap_or_default();
        previous_messages.push(json!({
            "role": "tool",
            "tool_call_id": call_id,
            "content": outputs.join("\n"),
        }));

        previous_messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::MessageState;
    use serde_json::json;

    #[test]
    fn test_build_context_plain_user() {
        let conversation =
            ConversationData::with_messages(vec![ConversationMessage::user("Hello")]);
        let spec = OpenAiContextBuilder.build_context(&conversation, None);

        assert_eq!(spec, vec![json!({"role": "user", "content": "Hello"})]);
    }

    #[test]
    fn test_build_context_is_deterministic() {
        let conversation = ConversationData::with_messages(vec![
            ConversationMessage::user("Hello"),
            ConversationMessage::assistant("Hi there"),
        ]);
        let first = OpenAiContextBuilder.build_context(&conversation, Some("be brief"));
        let second = OpenAiContextBuilder.build_context(&conversation, Some("be brief"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_system_prompt_prepended() {
        let conversation =
            ConversationData::with_messages(vec![ConversationMessage::user("Hello")]);
        let spec = OpenAiContextBuilder.build_context(&conversation, Some("be brief"));

        assert_eq!(spec.len(), 2);
        assert_eq!(spec[0]["role"], "system");
        assert_eq!(spec[0]["content"], "be brief");
    }

    #[test]
    fn test_unresolved_assistant_excluded() {
        let conversation = ConversationData::with_messages(vec![
            ConversationMessage::user("look this up"),
            ConversationMessage::assistant("on it")
                .with_tool_call(ToolCall::new("search", json!({"q": "a"})))
                .with_tool_call(ToolCall::new("fetch", json!({"url": "b"}))),
            ConversationMessage::user("any luck?"),
        ]);
        let spec = OpenAiContextBuilder.build_context(&conversation, None);

        assert_eq!(spec.len(), 2);
        assert_eq!(spec[0]["content"], "look this up");
        assert_eq!(spec[1]["content"], "any luck?");
    }

    #[test]
    fn test_resolved_tool_calls_emit_tool_messages() {
        let call = ToolCall::new("search", json!({"q": "rust"})).with_result(json!("3 hits"));
        let call_id = call.id.clone();
        let conversation = ConversationData::with_messages(vec![
            ConversationMessage::user("search rust"),
            ConversationMessage::assistant("searching").with_tool_call(call),
            ConversationMessage::user("thanks"),
        ]);
        let spec = OpenAiContextBuilder.build_context(&conversation, None);

        assert_eq!(spec.len(), 4);
        assert_eq!(spec[1]["role"], "assistant");
        assert_eq!(spec[1]["tool_calls"][0]["id"], call_id);
        assert_eq!(
            spec[1]["tool_calls"][0]["function"]["arguments"],
            "{\"q\":\"rust\"}"
        );
        assert_eq!(spec[2]["role"], "tool");
        assert_eq!(spec[2]["tool_call_id"], call_id);
        assert_eq!(spec[2]["content"], "3 hits");
    }

    #[test]
    fn test_standalone_tool_message_emitted_without_call_id() {
        let conversation = ConversationData::with_messages(vec![
            ConversationMessage::user("run it"),
            ConversationMessage::new(Role::Tool, "exit code 0"),
        ]);
        let spec = OpenAiContextBuilder.build_context(&conversation, None);

        assert_eq!(spec[1]["role"], "tool");
        assert_eq!(spec[1]["content"], "exit code 0");
        // No originating call to back-reference.
        assert!(spec[1].get("tool_call_id").is_none());
    }

    #[test]
    fn test_streaming_message_excluded_unless_last() {
        let conversation = ConversationData::with_messages(vec![
            ConversationMessage::user("hi"),
            ConversationMessage::assistant("partial").with_state(MessageState::Streaming),
            ConversationMessage::user("still there?"),
        ]);
        let spec = OpenAiContextBuilder.build_context(&conversation, None);
        assert_eq!(spec.len(), 2);

        // As the last message it is retained for mid-stream continuation.
        let conversation = ConversationData::with_messages(vec![
            ConversationMessage::user("hi"),
            ConversationMessage::assistant("partial").with_state(MessageState::Streaming),
        ]);
        let spec = OpenAiContextBuilder.build_context(&conversation, None);
        assert_eq!(spec.len(), 2);
    }

    #[test]
    fn test_append_tool_execution_grows_by_two() {
        let calls = vec![ToolCall::new("search", json!({"q": "rust"}))];
        let results = vec![json!("found it")];

        let spec = OpenAiContextBuilder.append_tool_execution(&calls, &results, Vec::new());
        assert_eq!(spec.len(), 2);

        let spec = OpenAiContextBuilder.append_tool_execution(&calls, &results, spec);
        assert_eq!(spec.len(), 4);

        assert_eq!(spec[0]["role"], "assistant");
        assert_eq!(spec[1]["role"], "tool");
        assert_eq!(spec[1]["content"], "found it");
        assert_eq!(spec[1]["tool_call_id"], spec[0]["tool_calls"][0]["id"]);
    }

    #[test]
    fn test_continuation_orders_and_falls_back_to_stored_result() {
        let call = ToolCall::new("search", json!({"q": "rust"})).with_result(json!("stored"));
        let spec = OpenAiContextBuilder.build_tool_continuation(
            "search rust",
            &[call],
            &[],
            None,
            Some("be brief"),
        );

        assert_eq!(spec.len(), 4);
        assert_eq!(spec[0]["role"], "system");
        assert_eq!(spec[1]["role"], "user");
        assert_eq!(spec[1]["content"], "search rust");
        assert_eq!(spec[2]["role"], "assistant");
        assert_eq!(spec[3]["role"], "tool");
        assert_eq!(spec[3]["content"], "stored");
    }

    #[test]
    fn test_continuation_skips_duplicate_user_prompt() {
        let previous = vec![json!({"role": "user", "content": "search rust"})];
        let call = ToolCall::new("search", json!({})).with_result(json!("ok"));
        let spec = OpenAiContextBuilder.build_tool_continuation(
            "search rust",
            &[call],
            &[],
            Some(&previous),
            None,
        );

        // history + invocation + result, no second user turn
        assert_eq!(spec.len(), 3);
        assert_eq!(spec[0]["role"], "user");
        assert_eq!(spec[1]["role"], "assistant");
    }

    #[test]
    fn test_malformed_arguments_pass_through() {
        // Arguments that failed to parse upstream are stored as a raw
        // string and must survive unchanged.
        let call = ToolCall::new("search", json!("{broken json"));
        let entry = OpenAiContextBuilder::tool_call_json(&call);
        assert_eq!(entry["function"]["arguments"], "{broken json");
    }
}
