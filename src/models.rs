// src/models.rs

use crate::constants::*;
use crate::error::{Result, ScoringError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Graded Inputs ---

/// Question difficulty on the 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: Difficulty = Difficulty(1);
    pub const MAX: Difficulty = Difficulty(5);

    pub fn new(value: i64) -> Result<Self> {
        if (1..=5).contains(&value) {
            Ok(Difficulty(value as u8))
        } else {
            Err(ScoringError::InvalidDifficulty(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Zero-based position, used to index per-difficulty tables.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = ScoringError;
    fn try_from(value: i64) -> Result<Self> {
        Difficulty::new(value)
    }
}

impl From<Difficulty> for i64 {
    fn from(d: Difficulty) -> Self {
        i64::from(d.0)
    }
}

/// Recall quality on the classic 6-point scale (0 = blackout, 5 = perfect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: i64) -> Result<Self> {
        if (0..=i64::from(MAX_QUALITY)).contains(&value) {
            Ok(Quality(value as u8))
        } else {
            Err(ScoringError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_pass(self) -> bool {
        self.0 >= PASSING_QUALITY
    }
}

impl TryFrom<i64> for Quality {
    type Error = ScoringError;
    fn try_from(value: i64) -> Result<Self> {
        Quality::new(value)
    }
}

impl From<Quality> for i64 {
    fn from(q: Quality) -> Self {
        i64::from(q.0)
    }
}

/// The four-button review control most clients show instead of the raw scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecallButton {
    Again,
    Hard,
    Good,
    Easy,
}

impl RecallButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecallButton::Again => "Again",
            RecallButton::Hard => "Hard",
            RecallButton::Good => "Good",
            RecallButton::Easy => "Easy",
        }
    }

    pub fn quality(self) -> Quality {
        match self {
            RecallButton::Again => Quality(1),
            RecallButton::Hard => Quality(3),
            RecallButton::Good => Quality(4),
            RecallButton::Easy => Quality(5),
        }
    }
}

impl FromStr for RecallButton {
    type Err = ScoringError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Again" => Ok(RecallButton::Again),
            "Hard" => Ok(RecallButton::Hard),
            "Good" => Ok(RecallButton::Good),
            "Easy" => Ok(RecallButton::Easy),
            other => Err(ScoringError::UnknownRecallButton(other.to_string())),
        }
    }
}

impl fmt::Display for RecallButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub difficulty: Difficulty,
    pub correct: bool,
}

impl Outcome {
    pub fn new(difficulty: i64, correct: bool) -> Result<Self> {
        Ok(Outcome {
            difficulty: Difficulty::new(difficulty)?,
            correct,
        })
    }
}

/// One submitted answer, as handed over by the quiz endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptInput {
    pub question_id: i64,
    pub chosen_option: String,
    pub correct: bool,
    pub difficulty: Difficulty,
}

impl AttemptInput {
    pub fn outcome(&self) -> Outcome {
        Outcome {
            difficulty: self.difficulty,
            correct: self.correct,
        }
    }
}

/// Immutable audit record of one graded answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedAttempt {
    pub question_id: i64,
    pub chosen_option: String,
    pub correct: bool,
    pub difficulty: Difficulty,
    pub delta: i64,
    pub rating_after: i64,
    pub answered_at: DateTime<Utc>,
}

// --- Rating Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub old_rating: i64,
    pub new_rating: i64,
    pub delta: i64,
}

impl RatingUpdate {
    pub fn unchanged(rating: i64) -> Self {
        RatingUpdate {
            old_rating: rating,
            new_rating: rating,
            delta: 0,
        }
    }
}

/// A named band of ratings. `max == None` marks the open-ended top tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub min: i64,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(default)]
    pub description: String,
}

impl Tier {
    pub fn contains(&self, rating: i64) -> bool {
        rating >= self.min && self.max.map_or(true, |max| rating <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreCause {
    QuizSession { session_id: i64 },
    Attempt { question_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub old_score: i64,
    pub change: i64,
    pub cause: ScoreCause,
}

/// Skill score for a user, optionally scoped to one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub rating: i64,
    pub tier_name: String,
    #[serde(default)]
    pub history: Vec<ScoreHistoryEntry>,
}

// --- Review Models ---

/// Scheduling state for one (user, flashcard) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub user_id: i64,
    pub flashcard_id: i64,
    pub times_reviewed: u32,
    pub ease_factor: f64,
    /// Interval produced by the previous review, in days. Zero before the first review.
    #[serde(default)]
    pub interval_days: u32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub next_review_at: Option<DateTime<Utc>>,
}

impl ReviewState {
    pub fn new(user_id: i64, flashcard_id: i64) -> Self {
        ReviewState {
            user_id,
            flashcard_id,
            times_reviewed: 0,
            ease_factor: EASE_FACTOR_DEFAULT,
            interval_days: 0,
            last_reviewed_at: None,
            next_review_at: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.times_reviewed == 0
    }
}
