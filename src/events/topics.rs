//! Canonical topic names shared by publishers and subscribers.

pub const TOOL_DETECTED: &str = "tool.detected";
pub const TOOL_STARTED: &str = "tool.started";
pub const TOOL_COMPLETED: &str = "tool.completed";

pub const BRANCH_CREATED: &str = "branch.created";
pub const BRANCH_COMPLETED: &str = "branch.completed";
pub const BRANCH_ABORTED: &str = "branch.aborted";

pub const STREAMING_DELTA: &str = "streaming.delta";
pub const STREAMING_FINISHED: &str = "streaming.finished";
