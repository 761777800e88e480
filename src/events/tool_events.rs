use serde_json::{json, Value};

use super::bus::EventBus;
use super::topics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEventKind {
    Detected,
    Started,
    Completed,
}

impl ToolEventKind {
    pub fn topic(&self) -> &'static str {
        match self {
            ToolEventKind::Detected => topics::TOOL_DETECTED,
            ToolEventKind::Started => topics::TOOL_STARTED,
            ToolEventKind::Completed => topics::TOOL_COMPLETED,
        }
    }
}

/// Stateless enrichment hop between raw tool-call events and the UI.
///
/// Raw tool identifiers look like `web_search.fetch-page`; the UI wants
/// "Web Search" / "Fetch Page". The coordinator derives those display
/// names, merges them with the addressee message id into the payload,
/// and republishes on the matching `tool.*` topic. It never touches the
/// conversation model — mutation stays with the streaming engine.
#[derive(Clone)]
pub struct ToolEventCoordinator {
    bus: EventBus,
}

impl ToolEventCoordinator {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    pub async fn handle_tool_event(&self, message_id: &str, kind: ToolEventKind, data: Value) {
        let payload = enrich(message_id, data);
        self.bus.publish(kind.topic(), payload).await;
    }
}

fn enrich(message_id: &str, data: Value) -> Value {
    let raw_name = data
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let (agent_name, action_name) = split_tool_name(&raw_name);

    let mut payload = match data {
        Value::Object(_) => data,
        other => json!({ "data": other }),
    };
    if let Some(object) = payload.as_object_mut() {
        object.insert("messageId".to_string(), json!(message_id));
        object.insert("agentName".to_string(), json!(agent_name));
        object.insert("actionName".to_string(), json!(action_name));
    }
    payload
}

/// Split a raw tool identifier into agent and action display names. The
/// first `.`/`:`/`/` separates agent from action; an undivided name is
/// all action.
fn split_tool_name(raw: &str) -> (String, String) {
    match raw.split_once(['.', ':', '/']) {
        Some((agent, action)) => (title_case(agent), title_case(action)),
        None => (String::new(), title_case(raw)),
    }
}

fn title_case(raw: &str) -> String {
    raw.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
