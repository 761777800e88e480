//! The event layer decoupling the streaming engine from its consumers.
//!
//! All cross-component signaling goes through one [`bus::EventBus`]
//! instance owned by the host. Publishers and subscribers agree on the
//! topic names in [`topics`]; [`tool_events::ToolEventCoordinator`]
//! sits between raw tool-call events and the UI, enriching payloads
//! with display metadata before republishing them.
pub mod bus;
pub mod tool_events;
pub mod topics;
