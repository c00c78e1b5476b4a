//! Failure taxonomy for game operations
//!
//! Every fallible operation in the crate surfaces one of these variants,
//! chosen so a transport layer can map each to a response code without
//! inspecting the message text.

use crate::store::StoreError;

/// Convenience alias for results produced by game operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by game operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced game, puzzle, or player does not exist
    #[error("{0}")]
    NotFound(String),
    /// The operation is not valid in the game's current phase
    #[error("{0}")]
    InvalidState(String),
    /// The request payload failed validation
    #[error("{0}")]
    Validation(String),
    /// The request conflicts with state that already exists
    #[error("{0}")]
    Conflict(String),
    /// The backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<garde::Report> for Error {
    fn from(report: garde::Report) -> Self {
        Self::Validation(report.to_string())
    }
}
