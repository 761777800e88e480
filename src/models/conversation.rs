use serde::{Deserialize, Serialize};

use super::ids::create_object_id;
use super::message::ConversationMessage;

/// An ordered conversation. Append-only except for the navigation
/// pointers living on individual messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationData {
    pub id: String,
    pub messages: Vec<ConversationMessage>,
}

impl ConversationData {
    pub fn new() -> Self {
        ConversationData {
            id: create_object_id("conv"),
            messages: Vec::new(),
        }
    }

    pub fn with_messages(messages: Vec<ConversationMessage>) -> Self {
        ConversationData {
            id: create_object_id("conv"),
            messages,
        }
    }

    pub fn push_message(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    pub fn last_message(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub fn last_message_mut(&mut self) -> Option<&mut ConversationMessage> {
        self.messages.last_mut()
    }
}

impl Default for ConversationData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_last() {
        let mut conversation = ConversationData::new();
        assert!(conversation.last_message().is_none());

        conversation.push_message(ConversationMessage::user("Hello"));
        conversation.push_message(ConversationMessage::assistant("Hi"));

        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.last_message().unwrap().content, "Hi");
    }

    #[test]
    fn test_roundtrip_serialization() {
        let conversation =
            ConversationData::with_messages(vec![ConversationMessage::user("Hello")]);
        let serialized = serde_json::to_string(&conversation).unwrap();
        let deserialized: ConversationData = serde_json::from_str(&serialized).unwrap();
        assert_eq!(conversation, deserialized);
    }
}
