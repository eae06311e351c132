//! Error types for the draft engine

use thiserror::Error;

/// Errors raised by configuration validation, pool construction and simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DraftError {
    #[error("Malformed configuration: {0}")]
    MalformedConfig(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Insufficient pool for {}: {available} candidates, {required} required", .category.as_deref().unwrap_or("all categories"))]
    InsufficientPool {
        /// `None` when the whole pool is smaller than the number of starting slots
        category: Option<String>,
        required: usize,
        available: usize,
    },

    #[error("No eligible candidate for team {team} at pick {pick}")]
    NoEligibleCandidate { pick: usize, team: usize },

    #[error("Invalid pick number {pick} (draft log has {len} picks)")]
    InvalidPick { pick: usize, len: usize },
}

impl DraftError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        DraftError::MalformedConfig(msg.into())
    }

    pub(crate) fn input(msg: impl Into<String>) -> Self {
        DraftError::MalformedInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DraftError>;
