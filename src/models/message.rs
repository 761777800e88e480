use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{ConversationError, ConversationResult};

use super::branch::{BranchStatus, MessageAlternativeBranch};
use super::ids::create_object_id;
use super::tool::ToolCall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageState {
    #[default]
    Normal,
    Streaming,
    Invalid,
}

/// A single turn in a conversation.
///
/// Content and tool calls have two views: the fields themselves hold the
/// original response, while `active_content`/`active_tool_calls` resolve
/// through the currently selected alternative branch. Readers must go
/// through the `active_*` accessors; reading the fields directly bleeds
/// stale parent content through while a retry is streaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub state: MessageState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_alternative_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_branches: Vec<MessageAlternativeBranch>,
}

impl ConversationMessage {
    pub fn new<S: Into<String>>(role: Role, content: S) -> Self {
        ConversationMessage {
            id: create_object_id("msg"),
            role,
            content: content.into(),
            created: Utc::now().timestamp(),
            tool_calls: Vec::new(),
            state: MessageState::Normal,
            active_alternative_id: None,
            alternative_branches: Vec::new(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_tool_call(mut self, call: ToolCall) -> Self {
        self.tool_calls.push(call);
        self
    }

    pub fn with_state(mut self, state: MessageState) -> Self {
        self.state = state;
        self
    }

    /// Resolve the currently selected branch. An id that no longer
    /// matches any branch is treated as "no active branch" rather than
    /// an error.
    pub fn active_branch(&self) -> Option<&MessageAlternativeBranch> {
        let id = self.active_alternative_id.as_deref()?;
        self.alternative_branches.iter().find(|b| b.id == id)
    }

    /// Content as a reader should see it. With an active branch this is
    /// the branch's content even when it is still empty; the parent
    /// content is used only when no branch is active.
    pub fn active_content(&self) -> &str {
        match self.active_branch() {
            Some(branch) => &branch.content,
            None => &self.content,
        }
    }

    /// Tool calls of the active branch, with the same no-fallback rule
    /// as `active_content`.
    pub fn active_tool_calls(&self) -> &[ToolCall] {
        match self.active_branch() {
            Some(branch) => &branch.tool_calls,
            None => &self.tool_calls,
        }
    }

    pub fn has_unresolved_tool_calls(&self) -> bool {
        self.active_tool_calls().iter().any(|call| !call.resolved())
    }

    /// Create a new pending alternative branch and return its id.
    pub fn add_alternative(&mut self) -> String {
        let branch = MessageAlternativeBranch::new();
        let id = branch.id.clone();
        self.alternative_branches.push(branch);
        id
    }

    pub fn branch_mut(&mut self, id: &str) -> Option<&mut MessageAlternativeBranch> {
        self.alternative_branches.iter_mut().find(|b| b.id == id)
    }

    /// Move a pending branch to streaming. At most one branch per
    /// message may stream at a time, so this is rejected while a sibling
    /// is mid-stream. Calling it again on the branch already streaming
    /// is accepted.
    pub fn begin_streaming(&mut self, branch_id: &str) -> ConversationResult<()> {
        if let Some(other) = self
            .alternative_branches
            .iter()
            .find(|b| b.status == BranchStatus::Streaming)
        {
            if other.id != branch_id {
                return Err(ConversationError::AlreadyStreaming(other.id.clone()));
            }
            return Ok(());
        }

        let branch = self
            .branch_mut(branch_id)
            .ok_or_else(|| ConversationError::UnknownBranch(branch_id.to_string()))?;
        match branch.status {
            BranchStatus::Pending => {
                branch.status = BranchStatus::Streaming;
                Ok(())
            }
            from => Err(ConversationError::InvalidTransition {
                id: branch_id.to_string(),
                from,
            }),
        }
    }

    /// Change which branch is selected. Navigation is permitted in any
    /// branch state, including onto a branch that is still streaming.
    pub fn set_active_alternative(&mut self, id: Option<&str>) -> ConversationResult<()> {
        if let Some(id) = id {
            if !self.alternative_branches.iter().any(|b| b.id == id) {
                return Err(ConversationError::UnknownBranch(id.to_string()));
            }
            self.active_alternative_id = Some(id.to_string());
        } else {
            self.active_alternative_id = None;
        }
        Ok(())
    }
}
