//! The conversation model shared by the streaming engine, the context
//! builders and the UI.
//!
//! Ownership is deliberately one-directional:
//! - the streaming engine is the only writer of message/branch content
//!   and status,
//! - the navigation controller is the only writer of the active branch
//!   pointer,
//! - everything else (context builders, the event layer, rendering)
//!   reads through the `active_*` accessors and never mutates.
//!
//! A message with no alternative branches is its own sole branch; the
//! accessors make that case indistinguishable from a single branch.
pub mod branch;
pub mod conversation;
pub mod ids;
pub mod message;
pub mod tool;
