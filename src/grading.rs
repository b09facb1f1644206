// src/grading.rs

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::models::{
    AttemptInput, GradedAttempt, Outcome, Quality, RatingUpdate, ReviewState, Score, ScoreCause,
    ScoreHistoryEntry,
};
use crate::rating::{PerAttemptRating, RatingPolicy, RatingStrategy};
use crate::scheduler;
use crate::tiers::{progress_within_tier, TierIssue};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

// --- Public Interface ---

/// What a grading call hands back to the request layer for persistence and display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    pub update: RatingUpdate,
    pub strategy: &'static str,
    pub tier_name: String,
    pub tier_changed: bool,
    pub progress: f64,
    pub points_to_next_tier: Option<i64>,
    pub tier_issue: Option<TierIssue>,
}

impl Score {
    /// Fresh score at the configured default rating, created on first interaction.
    pub fn new(user_id: i64, category_id: Option<i64>, config: &ScoringConfig) -> Self {
        let rating = config.default_rating.max(0);
        let tier_name = config
            .tiers
            .tier_for(rating)
            .map_or_else(|_| config.tiers.lowest().name.clone(), |l| l.tier.name.clone());
        Score {
            user_id,
            category_id,
            rating,
            tier_name,
            history: Vec::new(),
        }
    }
}

/// Binds the pure algorithms to the score and review models.
///
/// Loading prior state and persisting the result stay with the caller, which
/// must serialize updates per (user, category) and per (user, flashcard).
pub struct Grader<'a> {
    config: &'a ScoringConfig,
    attempt_policy: PerAttemptRating,
}

impl<'a> Grader<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        let attempt_policy = match &config.rating {
            RatingStrategy::PerAttempt(policy) => policy.clone(),
            RatingStrategy::SessionBatch(_) => PerAttemptRating::default(),
        };
        Grader {
            config,
            attempt_policy,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        self.config
    }

    pub fn new_score(&self, user_id: i64, category_id: Option<i64>) -> Score {
        Score::new(user_id, category_id, self.config)
    }

    /// Grades a finished quiz session with the configured rating strategy.
    pub fn grade_session(
        &self,
        score: &mut Score,
        outcomes: &[Outcome],
        cause: ScoreCause,
        now: DateTime<Utc>,
    ) -> Result<GradeReport> {
        info!(
            "Grading session for user {} (category {:?}): {} answers",
            score.user_id,
            score.category_id,
            outcomes.len()
        );
        let update = self.config.rating.apply_outcomes(score.rating, outcomes)?;
        self.apply_update(score, update, self.config.rating.name(), cause, now)
    }

    /// Grades a single answer and returns its immutable audit record.
    pub fn grade_attempt(
        &self,
        score: &mut Score,
        attempt: AttemptInput,
        now: DateTime<Utc>,
    ) -> Result<(GradedAttempt, GradeReport)> {
        let update = self
            .attempt_policy
            .apply_attempt(score.rating, &attempt.outcome())?;
        let cause = ScoreCause::Attempt {
            question_id: attempt.question_id,
        };
        let report = self.apply_update(score, update, self.attempt_policy.name(), cause, now)?;

        let record = GradedAttempt {
            question_id: attempt.question_id,
            chosen_option: attempt.chosen_option,
            correct: attempt.correct,
            difficulty: attempt.difficulty,
            delta: update.delta,
            rating_after: update.new_rating,
            answered_at: now,
        };
        Ok((record, report))
    }

    /// Schedules the next review of a flashcard from a raw 0-5 quality.
    pub fn review_flashcard(
        &self,
        state: &ReviewState,
        quality: i64,
        now: DateTime<Utc>,
    ) -> Result<ReviewState> {
        let quality = Quality::new(quality)?;
        scheduler::schedule_next(&self.config.scheduler, state, quality, now)
    }

    // --- Internal Logic ---

    fn apply_update(
        &self,
        score: &mut Score,
        update: RatingUpdate,
        strategy: &'static str,
        cause: ScoreCause,
        now: DateTime<Utc>,
    ) -> Result<GradeReport> {
        debug!("[Rating Update] {:?} via {}", update, strategy);

        if update.delta != 0 {
            score.history.push(ScoreHistoryEntry {
                timestamp: now,
                old_score: update.old_rating,
                change: update.delta,
                cause,
            });
        }
        score.rating = update.new_rating;

        let tiers = &self.config.tiers;
        let lookup = tiers.tier_for(score.rating)?;
        if let Some(issue) = &lookup.issue {
            warn!(
                "User {} scored against a misconfigured tier table: {}",
                score.user_id, issue
            );
        }

        let tier_changed = lookup.tier.name != score.tier_name;
        let previous_tier = std::mem::replace(&mut score.tier_name, lookup.tier.name.clone());

        info!(
            "[Rating Result] User {}: {} -> {} ({:+}), Tier {} -> {}",
            score.user_id,
            update.old_rating,
            update.new_rating,
            update.delta,
            previous_tier,
            score.tier_name
        );

        Ok(GradeReport {
            update,
            strategy,
            tier_name: score.tier_name.clone(),
            tier_changed,
            progress: progress_within_tier(score.rating, lookup.tier),
            points_to_next_tier: tiers
                .next_tier(lookup.tier)
                .map(|next| (next.min - score.rating).max(0)),
            tier_issue: lookup.issue,
        })
    }
}
