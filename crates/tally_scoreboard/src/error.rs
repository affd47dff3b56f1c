use thiserror::Error;

use crate::entry::{MAX_LINES, MAX_SCOREBOARD_ID};

/// Errors returned by scoreboard and registry operations.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ScoreboardError {
    #[error("scoreboard line {line} is out of range 0-{}", MAX_LINES)]
    LineOutOfRange { line: i64 },
    #[error("base line id {0} is above {}", MAX_SCOREBOARD_ID)]
    ScoreboardIdOutOfRange(i64),
    #[error("entry belongs to objective '{found}', not '{expected}'")]
    ObjectiveMismatch { expected: String, found: String },
    #[error("objective '{objective}' has no entry with line id {scoreboard_id}")]
    EntryNotFound {
        objective: String,
        scoreboard_id: i64,
    },
    #[error("objective '{0}' is not registered")]
    Inactive(String),
    #[error("only fake player entries can be padded")]
    NotFakePlayer,
    #[error("objective '{0}' already exists")]
    DuplicateObjective(String),
}

/// Broad classes of [`ScoreboardError`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ErrorKind {
    /// A line index or line id offset is outside `0..=MAX_LINES`, or a base
    /// line id leaves no room for the lines above it.
    Range,
    /// An entry was used with an objective it does not belong to.
    Mismatch,
    /// The operation is not valid in the current state.
    InvalidState,
    /// An objective name is already taken.
    DuplicateKey,
}

impl ScoreboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScoreboardError::LineOutOfRange { .. }
            | ScoreboardError::ScoreboardIdOutOfRange(_) => ErrorKind::Range,
            ScoreboardError::ObjectiveMismatch { .. } => ErrorKind::Mismatch,
            ScoreboardError::EntryNotFound { .. }
            | ScoreboardError::Inactive(_)
            | ScoreboardError::NotFakePlayer => ErrorKind::InvalidState,
            ScoreboardError::DuplicateObjective(_) => ErrorKind::DuplicateKey,
        }
    }
}
