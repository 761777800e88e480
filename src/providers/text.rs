use serde_json::{json, Value};

use super::base::ContextBuilder;
use super::utils::{includable_messages, result_value, value_text};
use crate::models::conversation::ConversationData;
use crate::models::message::{ConversationMessage, Role};
use crate::models::tool::ToolCall;

/// Builder for text-template APIs that admit only user and assistant
/// turns in strict alternation.
///
/// Tool calls are serialized into the assistant text as a literal
/// `[TOOL_CALLS][...][/TOOL_CALLS]` block; their results travel as raw
/// JSON text in the next user turn. Because the wire contract rejects
/// two consecutive same-role turns, entries are pushed through a merge
/// step: an identical repeat is skipped, a differing same-role entry is
/// folded into its predecessor. The system prompt is folded into the
/// first user turn for the same reason.
pub struct TextFormatContextBuilder;

impl TextFormatContextBuilder {
    /// Push an entry while preserving strict alternation. Same-role
    /// repeats with identical content are redundant and skipped; other
    /// same-role entries are merged into the previous turn.
    fn push_entry(spec: &mut Vec<Value>, role: &str, content: &str) {
        if content.is_empty() {
            return;
        }
        if let Some(last) = spec.last_mut() {
            if last["role"] == role {
                let existing = last["content"].as_str().unwrap_or_default();
                if existing == content {
                    return;
                }
                last["content"] = json!(format!("{}\n\n{}", existing, content));
                return;
            }
        }
        spec.push(json!({ "role": role, "content": content }));
    }

    fn tool_call_text(calls: &[ToolCall]) -> String {
        let entries: Vec<Value> = calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "name": call.name,
                    "arguments": call.parameters,
                })
            })
            .collect();
        format!(
            "[TOOL_CALLS]{}[/TOOL_CALLS]",
            serde_json::to_string(&entries).unwrap_or_default()
        )
    }

    fn tool_result_text(calls: &[ToolCall], results: &[Value]) -> String {
        let entries: Vec<Value> = calls
            .iter()
            .enumerate()
            .map(|(index, call)| {
                json!({
                    "id": call.id,
                    "result": result_value(call, results.get(index)),
                })
            })
            .collect();
        serde_json::to_string(&entries).unwrap_or_default()
    }

    fn assistant_text(message: &ConversationMessage) -> String {
        let content = message.active_content();
        let calls = message.active_tool_calls();
        if calls.is_empty() {
            return content.to_string();
        }
        let block = Self::tool_call_text(calls);
        if content.is_empty() {
            block
        } else {
            format!("{}\n{}", content, block)
        }
    }

    fn push_message(spec: &mut Vec<Value>, message: &ConversationMessage) {
        match message.role {
            Role::User | Role::Tool => {
                Self::push_entry(spec, "user", message.active_content());
            }
            Role::Assistant => {
                Self::push_entry(spec, "assistant", &Self::assistant_text(message));

                let calls = message.active_tool_calls();
                let resolved: Vec<ToolCall> = calls
                    .iter()
                    .filter(|call| call.resolved())
                    .cloned()
                    .collect();
                if !resolved.is_empty() {
                    Self::push_entry(spec, "user", &Self::tool_result_text(&resolved, &[]));
                }
            }
        }
    }
}

impl ContextBuilder for TextFormatContextBuilder {
    fn build_context(
        &self,
        conversation: &ConversationData,
        system_prompt: Option<&str>,
    ) -> Vec<Value> {
        let mut spec = Vec::new();
        // Folded into the first user turn by the merge step.
        if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
            Self::push_entry(&mut spec, "user", system);
        }
        for message in includable_messages(conversation) {
            Self::push_message(&mut spec, message);
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
                Self::push_entry(&mut spec, "user", system);
            }
        }
        // Re-push history through the merge step so alternation holds
        // even when the supplied history violates it.
        for entry in previous {
            let role = entry["role"].as_str().unwrap_or("user");
            let content = match &entry["content"] {
                Value::String(text) => text.clone(),
                other => value_text(other),
            };
            Self::push_entry(&mut spec, role, &content);
        }

        // An exact repeat of the user prompt at the tail is skipped by
        // push_entry; a differing tail merges instead.
        Self::push_entry(&mut spec, "user", user_prompt);

        self.append_tool_execution(tool_calls, tool_results, spec)
    }

    fn append_tool_execution(
        &self,
        tool_calls: &[ToolCall],
        tool_results: &[Value],
        mut previous_messages: Vec<Value>,
    ) -> Vec<Value> {
        previous_messages.push(json!({
            "role": "assistant",
            "content": Self::tool_call_text(tool_calls),
        }));
        previous_messages.push(json!({
            "role": "user",
            "content": Self::tool_result_text(tool_calls, tool_results),
        }));
        previous_messages
    }
}
