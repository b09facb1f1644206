// src/rating.rs

use crate::constants::*;
use crate::error::{Result, ScoringError};
use crate::models::{Difficulty, Outcome, RatingUpdate};
use log::debug;
use serde::{Deserialize, Serialize};

// --- Shared Formulas ---

/// Logistic ELO expectation that `player` beats `question`.
pub fn expected_score(player: f64, question: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((question - player) / ELO_SCALE))
}

fn ensure_non_negative(rating: i64) -> Result<()> {
    if rating < 0 {
        return Err(ScoringError::NegativeRating(rating));
    }
    Ok(())
}

fn validate_multipliers(multipliers: &[f64; 5]) -> Result<()> {
    if multipliers.iter().any(|m| !m.is_finite() || *m <= 0.0) {
        return Err(ScoringError::Config(
            "difficulty multipliers must be positive".to_string(),
        ));
    }
    if multipliers.windows(2).any(|w| w[1] < w[0]) {
        return Err(ScoringError::Config(
            "difficulty multipliers must not decrease with difficulty".to_string(),
        ));
    }
    Ok(())
}

/// Common interface over the rating policies so callers can swap them freely.
pub trait RatingPolicy {
    fn name(&self) -> &'static str;

    /// Applies a batch of graded outcomes to `current_rating`.
    ///
    /// An empty batch leaves the rating untouched. The returned `delta` is the
    /// change actually applied, so it already reflects the floor at zero.
    fn apply_outcomes(&self, current_rating: i64, outcomes: &[Outcome]) -> Result<RatingUpdate>;
}

// --- Session Batch ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KBand {
    pub min_rating: i64,
    pub k: f64,
}

/// ELO update over a whole quiz session, averaged across its answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionBatchRating {
    /// Sorted by `min_rating`; K must not grow as ratings climb.
    pub k_bands: Vec<KBand>,
    pub question_rating_base: f64,
    pub question_rating_step: f64,
    pub difficulty_multipliers: [f64; 5],
}

impl Default for SessionBatchRating {
    fn default() -> Self {
        SessionBatchRating {
            k_bands: vec![
                KBand {
                    min_rating: 0,
                    k: K_FACTOR_HIGH,
                },
                KBand {
                    min_rating: K_BAND_MID_FLOOR,
                    k: K_FACTOR_MID,
                },
                KBand {
                    min_rating: K_BAND_LOW_FLOOR,
                    k: K_FACTOR_LOW,
                },
            ],
            question_rating_base: QUESTION_RATING_BASE,
            question_rating_step: QUESTION_RATING_STEP,
            difficulty_multipliers: DIFFICULTY_MULTIPLIERS,
        }
    }
}

impl SessionBatchRating {
    pub fn k_factor(&self, rating: i64) -> f64 {
        self.k_bands
            .iter()
            .rev()
            .find(|band| rating >= band.min_rating)
            .or_else(|| self.k_bands.first())
            .map_or(K_FACTOR_HIGH, |band| band.k)
    }

    pub fn question_rating(&self, difficulty: Difficulty) -> f64 {
        self.question_rating_base + f64::from(difficulty.value() - 1) * self.question_rating_step
    }

    pub fn difficulty_multiplier(&self, difficulty: Difficulty) -> f64 {
        self.difficulty_multipliers[difficulty.index()]
    }

    /// Unrounded contribution of one outcome, before averaging.
    pub fn outcome_change(&self, current_rating: i64, outcome: &Outcome) -> f64 {
        let k = self.k_factor(current_rating);
        let expected = expected_score(
            current_rating as f64,
            self.question_rating(outcome.difficulty),
        );
        let actual = if outcome.correct { 1.0 } else { 0.0 };
        k * self.difficulty_multiplier(outcome.difficulty) * (actual - expected)
    }

    pub fn validate(&self) -> Result<()> {
        if self.k_bands.is_empty() {
            return Err(ScoringError::Config("at least one K band is required".to_string()));
        }
        if self.k_bands[0].min_rating != 0 {
            return Err(ScoringError::Config("the first K band must start at 0".to_string()));
        }
        if self.k_bands.iter().any(|b| !b.k.is_finite() || b.k <= 0.0) {
            return Err(ScoringError::Config("K factors must be positive".to_string()));
        }
        for pair in self.k_bands.windows(2) {
            if pair[1].min_rating <= pair[0].min_rating {
                return Err(ScoringError::Config(
                    "K bands must be sorted by strictly increasing rating".to_string(),
                ));
            }
            if pair[1].k > pair[0].k {
                return Err(ScoringError::Config(
                    "K factor must not increase with rating".to_string(),
                ));
            }
        }
        if !self.question_rating_step.is_finite() || self.question_rating_step < 0.0 {
            return Err(ScoringError::Config(
                "question rating step must be non-negative".to_string(),
            ));
        }
        validate_multipliers(&self.difficulty_multipliers)
    }
}

impl RatingPolicy for SessionBatchRating {
    fn name(&self) -> &'static str {
        "session_batch"
    }

    fn apply_outcomes(&self, current_rating: i64, outcomes: &[Outcome]) -> Result<RatingUpdate> {
        ensure_non_negative(current_rating)?;
        if outcomes.is_empty() {
            return Ok(RatingUpdate::unchanged(current_rating));
        }

        let total: f64 = outcomes
            .iter()
            .map(|o| self.outcome_change(current_rating, o))
            .sum();
        let mean = total / outcomes.len() as f64;
        let new_rating = (current_rating + mean.round() as i64).max(0);

        debug!(
            "[Rating Input] Session batch: rating {}, {} outcomes, K {:.0}, mean change {:.2}",
            current_rating,
            outcomes.len(),
            self.k_factor(current_rating),
            mean
        );

        Ok(RatingUpdate {
            old_rating: current_rating,
            new_rating,
            delta: new_rating - current_rating,
        })
    }
}

// --- Per Attempt ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloFactorBand {
    pub min_rating: i64,
    pub factor: f64,
}

/// Fixed-magnitude update applied one answer at a time, capped per attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerAttemptRating {
    pub gain_correct: f64,
    pub loss_incorrect: f64,
    pub difficulty_multipliers: [f64; 5],
    /// Sorted by `min_rating`; the factor shrinks as the rating climbs.
    pub elo_factor_bands: Vec<EloFactorBand>,
    pub max_change: i64,
}

impl Default for PerAttemptRating {
    fn default() -> Self {
        PerAttemptRating {
            gain_correct: ATTEMPT_GAIN_CORRECT,
            loss_incorrect: ATTEMPT_LOSS_INCORRECT,
            difficulty_multipliers: DIFFICULTY_MULTIPLIERS,
            elo_factor_bands: ATTEMPT_ELO_FACTOR_BANDS
                .iter()
                .map(|&(min_rating, factor)| EloFactorBand { min_rating, factor })
                .collect(),
            max_change: ATTEMPT_MAX_CHANGE,
        }
    }
}

impl PerAttemptRating {
    pub fn elo_factor(&self, rating: i64) -> f64 {
        self.elo_factor_bands
            .iter()
            .rev()
            .find(|band| rating >= band.min_rating)
            .or_else(|| self.elo_factor_bands.first())
            .map_or(1.0, |band| band.factor)
    }

    /// Clamped change for a single answer at `current_rating`.
    pub fn attempt_delta(&self, current_rating: i64, outcome: &Outcome) -> i64 {
        let base = if outcome.correct {
            self.gain_correct
        } else {
            -self.loss_incorrect
        };
        let raw = base
            * self.difficulty_multipliers[outcome.difficulty.index()]
            * self.elo_factor(current_rating);
        let cap = self.max_change.max(0);
        (raw.round() as i64).clamp(-cap, cap)
    }

    /// Grades one answer, returning the update with the rating floored at zero.
    pub fn apply_attempt(&self, current_rating: i64, outcome: &Outcome) -> Result<RatingUpdate> {
        ensure_non_negative(current_rating)?;
        let new_rating = (current_rating + self.attempt_delta(current_rating, outcome)).max(0);
        Ok(RatingUpdate {
            old_rating: current_rating,
            new_rating,
            delta: new_rating - current_rating,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.gain_correct.is_finite() && self.gain_correct >= 0.0)
            || !(self.loss_incorrect.is_finite() && self.loss_incorrect >= 0.0)
        {
            return Err(ScoringError::Config(
                "attempt gain and loss must be non-negative".to_string(),
            ));
        }
        if self.max_change < 0 {
            return Err(ScoringError::Config(
                "maximum change per attempt must be non-negative".to_string(),
            ));
        }
        if self.elo_factor_bands.is_empty() || self.elo_factor_bands[0].min_rating != 0 {
            return Err(ScoringError::Config(
                "ELO factor bands must start at rating 0".to_string(),
            ));
        }
        for pair in self.elo_factor_bands.windows(2) {
            if pair[1].min_rating <= pair[0].min_rating || pair[1].factor > pair[0].factor {
                return Err(ScoringError::Config(
                    "ELO factor bands must be sorted and non-increasing".to_string(),
                ));
            }
        }
        validate_multipliers(&self.difficulty_multipliers)
    }
}

impl RatingPolicy for PerAttemptRating {
    fn name(&self) -> &'static str {
        "per_attempt"
    }

    fn apply_outcomes(&self, current_rating: i64, outcomes: &[Outcome]) -> Result<RatingUpdate> {
        ensure_non_negative(current_rating)?;

        // Each answer is graded against the rating left by the previous one.
        let mut running = current_rating;
        for outcome in outcomes {
            running = self.apply_attempt(running, outcome)?.new_rating;
        }

        debug!(
            "[Rating Input] Per attempt: rating {}, {} outcomes, ending at {}",
            current_rating,
            outcomes.len(),
            running
        );

        Ok(RatingUpdate {
            old_rating: current_rating,
            new_rating: running,
            delta: running - current_rating,
        })
    }
}

// --- Strategy Selection ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RatingStrategy {
    SessionBatch(SessionBatchRating),
    PerAttempt(PerAttemptRating),
}

impl Default for RatingStrategy {
    fn default() -> Self {
        RatingStrategy::SessionBatch(SessionBatchRating::default())
    }
}

impl RatingStrategy {
    pub fn validate(&self) -> Result<()> {
        match self {
            RatingStrategy::SessionBatch(policy) => policy.validate(),
            RatingStrategy::PerAttempt(policy) => policy.validate(),
        }
    }
}

impl RatingPolicy for RatingStrategy {
    fn name(&self) -> &'static str {
        match self {
            RatingStrategy::SessionBatch(policy) => policy.name(),
            RatingStrategy::PerAttempt(policy) => policy.name(),
        }
    }

    fn apply_outcomes(&self, current_rating: i64, outcomes: &[Outcome]) -> Result<RatingUpdate> {
        match self {
            RatingStrategy::SessionBatch(policy) => policy.apply_outcomes(current_rating, outcomes),
            RatingStrategy::PerAttempt(policy) => policy.apply_outcomes(current_rating, outcomes),
        }
    }
}
