//! Vote intake and daily tally.
//!
//! Both halves take the calendar date as an argument instead of reading the
//! clock, so callers decide what "today" is.
//!
//! Intake runs every existence and duplicate check inside the same
//! transaction as its inserts. The unique indexes on `votes` back those
//! checks up: a racing writer that slips past the lookup fails on insert and
//! is reported as the same conflict the lookup would have produced.

use sea_orm::DbErr;
use thiserror::Error;

use crate::entities::is_unique_violation;

pub mod intake;
pub mod tally;

pub use intake::{
    Ballot, RankedChoiceBallot, Receipt, SingleChoiceBallot, cast, ensure_distinct_choices,
};
pub use tally::{daily_standings, daily_winner};

pub const MENU_NOT_FOUND: &str = "Menu does not exist";
pub const EMPLOYEE_NOT_VALID: &str = "Employee ID is not valid";
pub const ALREADY_VOTED_FOR_MENU: &str = "You have already voted for this menu today";
pub const ALREADY_VOTED_TODAY: &str = "You have already voted today";
pub const CHOICES_NOT_DISTINCT: &str = "Menu choices must be three distinct menus";

#[derive(Debug, Error)]
pub enum VoteError {
    /// Malformed ballot, e.g. repeated menu choices.
    #[error("{0}")]
    Validation(String),
    /// A referenced menu does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The voting employee does not exist.
    #[error("{0}")]
    InvalidInput(String),
    /// The employee already holds a vote that this ballot would duplicate.
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl VoteError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Maps a failed insert to `Conflict` when a unique index rejected it.
pub(crate) fn conflict_or_database(err: DbErr, message: &str) -> VoteError {
    if is_unique_violation(&err) {
        VoteError::Conflict(message.to_string())
    } else {
        VoteError::Database(err)
    }
}
