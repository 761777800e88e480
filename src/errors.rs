use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::branch::BranchStatus;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ConversationError {
    #[error("Unknown branch: {0}")]
    UnknownBranch(String),

    #[error("Branch {id} cannot leave {from:?}")]
    InvalidTransition { id: String, from: BranchStatus },

    #[error("Branch {0} is still streaming")]
    AlreadyStreaming(String),
}

pub type ConversationResult<T> = Result<T, ConversationError>;
