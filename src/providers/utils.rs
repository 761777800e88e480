use regex::Regex;
use serde_json::Value;

use crate::models::conversation::ConversationData;
use crate::models::message::{ConversationMessage, MessageState, Role};
use crate::models::tool::ToolCall;

/// Decide whether a stored message belongs in a provider request.
///
/// The last message is retained even when empty or still streaming, so
/// a continuation can be built mid-stream. That override does not
/// extend to an invalid message: there is nothing to continue from, so
/// it is dropped wherever it sits. Everything else is dropped when it
/// is streaming, a user turn with only whitespace, an assistant turn
/// with neither content nor tool calls, or an assistant turn with an
/// unresolved tool call.
pub fn is_includable(message: &ConversationMessage, is_last: bool) -> bool {
    if message.state == MessageState::Invalid {
        return false;
    }
    if is_last {
        return true;
    }
    if message.state == MessageState::Streaming {
        return false;
    }
    match message.role {
        Role::User => !message.active_content().trim().is_empty(),
        Role::Assistant => {
            if message.active_content().trim().is_empty() && message.active_tool_calls().is_empty()
            {
                return false;
            }
            !message.has_unresolved_tool_calls()
        }
        Role::Tool => true,
    }
}

/// The messages `build_context` should translate, in order.
pub fn includable_messages(conversation: &ConversationData) -> Vec<&ConversationMessage> {
    let last_index = conversation.messages.len().saturating_sub(1);
    conversation
        .messages
        .iter()
        .enumerate()
        .filter(|(index, message)| is_includable(message, *index == last_index))
        .map(|(_, message)| message)
        .collect()
}

pub fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

/// Stringify a stored JSON value for a text slot. Strings pass through
/// unquoted; anything else is serialized. Malformed arguments that were
/// stored as raw strings therefore survive untouched.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Resolve the output text for a tool call: an explicitly supplied
/// result wins, then the result stored on the call, then its error.
pub fn result_text(call: &ToolCall, supplied: Option<&Value>) -> String {
    if let Some(value) = supplied.or(call.result.as_ref()) {
        value_text(value)
    } else if let Some(error) = &call.error {
        format!("Error: {}", error)
    } else {
        tracing::debug!(call = %call.name, "tool call has no output yet, emitting empty text");
        String::new()
    }
}

/// Resolve the output value for a tool call, preferring the supplied
/// result over the stored one. Used where a provider wants structured
/// output rather than text.
pub fn result_value(call: &ToolCall, supplied: Option<&Value>) -> Value {
    if let Some(value) = supplied.or(call.result.as_ref()) {
        value.clone()
    } else if let Some(error) = &call.error {
        Value::String(format!("Error: {}", error))
    } else {
        Value::String(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_function_name() {
        assert_eq!(sanitize_function_name("hello-world"), "hello-world");
        assert_eq!(sanitize_function_name("hello world"), "hello_world");
        assert_eq!(sanitize_function_name("hello@world"), "hello_world");
    }

    #[test]
    fn test_invalid_and_streaming_excluded() {
        let invalid = ConversationMessage::user("hi").with_state(MessageState::Invalid);
        let streaming =
            ConversationMessage::assistant("partial").with_state(MessageState::Streaming);
        assert!(!is_includable(&invalid, false));
        assert!(!is_includable(&streaming, false));
    }

    #[test]
    fn test_invalid_message_excluded_even_as_last() {
        let message = ConversationMessage::assistant("garbled").with_state(MessageState::Invalid);
        assert!(!is_includable(&message, true));

        // Streaming keeps the last-message override.
        let streaming =
            ConversationMessage::assistant("partial").with_state(MessageState::Streaming);
        assert!(is_includable(&streaming, true));
    }

    #[test]
    fn test_whitespace_user_message_excluded() {
        let message = ConversationMessage::user("   \n ");
        assert!(!is_includable(&message, false));
    }

    #[test]
    fn test_empty_assistant_excluded_unless_last() {
        let message = ConversationMessage::assistant("");
        assert!(!is_includable(&message, false));
        assert!(is_includable(&message, true));
    }

    #[test]
    fn test_unresolved_tool_calls_exclude_assistant() {
        let message = ConversationMessage::assistant("calling tools")
            .with_tool_call(ToolCall::new("search", json!({})))
            .with_tool_call(ToolCall::new("fetch", json!({})));
        assert!(!is_includable(&message, false));

        let resolved = ConversationMessage::assistant("calling tools")
            .with_tool_call(ToolCall::new("search", json!({})).with_result(json!("ok")));
        assert!(is_includable(&resolved, false));
    }

    #[test]
    fn test_result_text_precedence() {
        let call = ToolCall::new("search", json!({})).with_result(json!({"hits": 1}));
        assert_eq!(result_text(&call, None), "{\"hits\":1}");
        assert_eq!(result_text(&call, Some(&json!("fresh"))), "fresh");

        let failed = ToolCall::new("search", json!({})).with_error("boom");
        assert_eq!(result_text(&failed, None), "Error: boom");

        let pending = ToolCall::new("search", json!({}));
        assert_eq!(result_text(&pending, None), "");
    }

    #[test]
    fn test_includable_messages_keeps_order() {
        let conversation = ConversationData::with_messages(vec![
            ConversationMessage::user("first"),
            ConversationMessage::assistant(""),
            ConversationMessage::user("second"),
        ]);
        let kept = includable_messages(&conversation);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].content, "first");
        assert_eq!(kept[1].content, "second");
    }
}
