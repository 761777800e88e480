use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ids::create_object_id;

/// A tool invocation recorded on an assistant turn.
///
/// `result` and `error` are mutually exclusive: the call is resolved
/// once exactly one of them is set. While both are absent the call is
/// still in flight, which disqualifies the owning message from context
/// building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub parameters: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Opaque token some "thinking" models attach to a call; echoed
    /// byte-for-byte on the next request, never parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl ToolCall {
    pub fn new<S: Into<String>>(name: S, parameters: Value) -> Self {
        ToolCall {
            id: create_object_id("call"),
            name: name.into(),
            parameters,
            result: None,
            error: None,
            thought_signature: None,
        }
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self.error = None;
        self
    }

    pub fn with_error<S: Into<String>>(mut self, error: S) -> Self {
        self.error = Some(error.into());
        self.result = None;
        self
    }

    pub fn with_thought_signature<S: Into<String>>(mut self, signature: S) -> Self {
        self.thought_signature = Some(signature.into());
        self
    }

    /// A call is resolved once exactly one of result or error is set.
    pub fn resolved(&self) -> bool {
        self.result.is_some() ^ self.error.is_some()
    }
}
