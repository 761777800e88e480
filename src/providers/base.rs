use serde_json::Value;

use crate::models::conversation::ConversationData;
use crate::models::tool::ToolCall;

/// Translates the stored conversation model into the literal message
/// array a provider accepts as its request body.
///
/// All three operations are pure and infallible. Degraded input (e.g.
/// unparsable stored tool arguments) produces a degraded but valid
/// payload; a translation problem must never abort an in-progress
/// conversation turn.
pub trait ContextBuilder: Send + Sync {
    /// Filter the conversation down to sendable messages and map each
    /// one to the provider shape, optionally prepending a system entry.
    ///
    /// A message is dropped when it is invalid or still streaming, a
    /// user turn with only whitespace, an assistant turn with neither
    /// content nor tool calls, or an assistant turn with an unresolved
    /// tool call. The last message is retained even when empty or
    /// streaming, so a continuation can be built mid-stream; an invalid
    /// last message is still dropped.
    fn build_context(
        &self,
        conversation: &ConversationData,
        system_prompt: Option<&str>,
    ) -> Vec<Value>;

    /// Build the follow-up request after local tool execution: optional
    /// system entry, prior history, the original user prompt (skipped
    /// when the tail of `previous_messages` already carries it), the
    /// assistant tool-invocation turn and the tool-result turn.
    ///
    /// `tool_results` is index-aligned with `tool_calls`; a missing
    /// index falls back to the result or error stored on the call.
    fn build_tool_continuation(
        &self,
        user_prompt: &str,
        tool_calls: &[ToolCall],
        tool_results: &[Value],
        previous_messages: Option<&[Value]>,
        system_prompt: Option<&str>,
    ) -> Vec<Value>;

    /// Append exactly two entries — the tool-invocation turn and the
    /// tool-result turn — to an existing request. Never re-adds a user
    /// turn; used when chaining multiple tool rounds within one
    /// assistant turn.
    fn append_tool_execution(
        &self,
        tool_calls: &[ToolCall],
        tool_results: &[Value],
        previous_messages: Vec<Value>,
    ) -> Vec<Value>;
}
