//! Core conversation model for branch-aware LLM chat clients.
//!
//! This crate owns two things: the persisted, provider-agnostic
//! conversation model (messages, retried "alternative" branches, tool
//! calls) and the translation of that model into the literal request
//! shape each chat API expects. A small event bus decouples the
//! streaming engine that mutates the model from the consumers that
//! render it.
//!
//! Transport, persistence and rendering live in the host application;
//! everything here is either pure translation or in-memory state.

pub mod errors;
pub mod events;
pub mod models;
pub mod providers;
