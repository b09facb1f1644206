// src/error.rs

use thiserror::Error;

/// Errors surfaced by the scoring core.
///
/// Validation variants mean the caller broke the input contract. Algorithmic
/// clamps (rating floor, ease floor, interval ceiling) never produce errors.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("difficulty must be between 1 and 5, got {0}")]
    InvalidDifficulty(i64),

    #[error("quality must be between 0 and 5, got {0}")]
    InvalidQuality(i64),

    #[error("unknown recall button: {0}")]
    UnknownRecallButton(String),

    #[error("rating must not be negative, got {0}")]
    NegativeRating(i64),

    #[error("invalid review state: {0}")]
    InvalidReviewState(String),

    #[error("tier table is empty")]
    EmptyTierTable,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
