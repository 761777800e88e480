use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ids::create_object_id;
use super::tool::ToolCall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchStatus {
    Pending,
    Streaming,
    Complete,
    Aborted,
}

impl BranchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BranchStatus::Complete | BranchStatus::Aborted)
    }
}

/// One candidate assistant response among possibly several alternatives
/// for a turn, produced by retrying. Owned exclusively by its parent
/// message.
///
/// Lifecycle: pending → streaming → {complete | aborted}, or pending →
/// aborted when canceled before the first delta. Terminal states never
/// transition further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAlternativeBranch {
    pub id: String,
    pub status: BranchStatus,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    pub created_at: i64,
}

impl MessageAlternativeBranch {
    pub fn new() -> Self {
        MessageAlternativeBranch {
            id: create_object_id("alt"),
            status: BranchStatus::Pending,
            content: String::new(),
            tool_calls: Vec::new(),
            created_at: Utc::now().timestamp(),
        }
    }

    /// Append a streamed chunk. The first delta moves a pending branch
    /// to streaming. Chunks arriving after a terminal status are dropped.
    pub fn append_delta(&mut self, chunk: &str) {
        if self.status.is_terminal() {
            return;
        }
        if self.status == BranchStatus::Pending {
            self.status = BranchStatus::Streaming;
        }
        self.content.push_str(chunk);
    }

    /// Graceful end of stream. No-op once terminal.
    pub fn complete(&mut self) {
        if !self.status.is_terminal() {
            self.status = BranchStatus::Complete;
        }
    }

    /// Cancellation or stream error. Idempotent; a no-op once terminal,
    /// so a late cancel never downgrades a completed branch.
    pub fn abort(&mut self) {
        if !self.status.is_terminal() {
            self.status = BranchStatus::Aborted;
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl Default for MessageAlternativeBranch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let mut branch = MessageAlternativeBranch::new();
        assert_eq!(branch.status, BranchStatus::Pending);

        branch.append_delta("Hello");
        assert_eq!(branch.status, BranchStatus::Streaming);
        branch.append_delta(", world");
        assert_eq!(branch.content, "Hello, world");

        branch.complete();
        assert_eq!(branch.status, BranchStatus::Complete);

        // Abort after completion is a no-op.
        branch.abort();
        assert_eq!(branch.status, BranchStatus::Complete);
    }

    #[test]
    fn test_abort_before_first_delta() {
        let mut branch = MessageAlternativeBranch::new();
        branch.abort();
        assert_eq!(branch.status, BranchStatus::Aborted);

        // Terminal states never transition further.
        branch.complete();
        assert_eq!(branch.status, BranchStatus::Aborted);
    }

    #[test]
    fn test_deltas_dropped_after_terminal() {
        let mut branch = MessageAlternativeBranch::new();
        branch.append_delta("partial");
        branch.abort();
        branch.append_delta(" more");
        assert_eq!(branch.content, "partial");
    }

    #[test]
    fn test_abort_is_idempotent() {
        let mut branch = MessageAlternativeBranch::new();
        branch.append_delta("x");
        branch.abort();
        branch.abort();
        assert_eq!(branch.status, BranchStatus::Aborted);
    }
}
