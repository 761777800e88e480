//! Translation of the stored conversation model into provider request
//! payloads.
//!
//! Each supported chat API speaks a materially different dialect:
//! - OpenAI-compatible: structured `tool_calls` with stringified JSON
//!   arguments and a dedicated `tool` role for results,
//! - Anthropic: content-block arrays where tool results travel as user
//!   turns,
//! - Google: parts-based function calls carrying opaque thought
//!   signatures,
//! - plain text: tool calls serialized into the message text with
//!   strict user/assistant alternation.
//!
//! The builders are pure: same conversation in, same wire array out,
//! so a retried request is reproducible. They also never fail — a
//! malformed stored tool call degrades to string pass-through rather
//! than aborting the turn.
pub mod anthropic;
pub mod base;
pub mod factory;
pub mod google;
pub mod openai;
pub mod text;
pub mod utils;
