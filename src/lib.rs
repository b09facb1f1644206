// src/lib.rs

//! Scoring core for the flashcard quiz trainer: ELO-style skill ratings with
//! named tiers, and SM-2 review scheduling for flashcards.

pub mod config;
pub mod constants;
pub mod error;
pub mod grading;
pub mod logging;
pub mod models;
pub mod rating;
pub mod scheduler;
pub mod tiers;

pub use config::ScoringConfig;
pub use error::{Result, ScoringError};
pub use grading::{GradeReport, Grader};
pub use models::{
    AttemptInput, Difficulty, GradedAttempt, Outcome, Quality, RatingUpdate, RecallButton,
    ReviewState, Score, ScoreCause, ScoreHistoryEntry, Tier,
};
pub use rating::{PerAttemptRating, RatingPolicy, RatingStrategy, SessionBatchRating};
pub use scheduler::{schedule_next, SchedulerConfig};
pub use tiers::{progress_within_tier, TierIssue, TierLookup, TierTable};
