// src/scheduler.rs

//! SM-2 review scheduling for flashcards.
//!
//! - Quality 0-2 is a lapse: the card goes back to one review and a one day interval
//! - Quality 3-5 grows the interval: 1 day, then 6 days, then previous interval x ease
//! - The ease factor moves on every review and never drops below its floor

use crate::constants::*;
use crate::error::{Result, ScoringError};
use crate::models::{Quality, RecallButton, ReviewState};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub default_ease: f64,
    pub min_ease: f64,
    pub first_interval_days: u32,
    pub second_interval_days: u32,
    pub fail_interval_days: u32,
    pub max_interval_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            default_ease: EASE_FACTOR_DEFAULT,
            min_ease: EASE_FACTOR_MIN,
            first_interval_days: INTERVAL_FIRST,
            second_interval_days: INTERVAL_SECOND,
            fail_interval_days: INTERVAL_FAIL,
            max_interval_days: INTERVAL_MAX,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_ease.is_finite() && self.min_ease > 0.0) {
            return Err(ScoringError::Config("minimum ease must be positive".to_string()));
        }
        if !self.default_ease.is_finite() || self.default_ease < self.min_ease {
            return Err(ScoringError::Config(
                "default ease must not be below the minimum ease".to_string(),
            ));
        }
        if self.max_interval_days < 1
            || self.first_interval_days < 1
            || self.second_interval_days < 1
            || self.fail_interval_days < 1
        {
            return Err(ScoringError::Config("intervals must be at least one day".to_string()));
        }
        Ok(())
    }

    /// Longest allowed interval; never below one day, even for an unvalidated config.
    fn ceiling(&self) -> u32 {
        self.max_interval_days.max(1)
    }

    fn cap(&self, days: u32) -> u32 {
        days.max(1).min(self.ceiling())
    }

    fn grow(&self, previous: u32, ease: f64) -> u32 {
        let next = (f64::from(previous) * ease).round();
        if next >= f64::from(self.ceiling()) {
            self.ceiling()
        } else {
            self.cap(next as u32)
        }
    }

    /// Interval for the `reps`-th consecutive successful review.
    ///
    /// Only needed for states persisted without their last interval.
    fn rebuild_interval(&self, reps: u32, ease: f64) -> u32 {
        let mut interval = self.cap(self.first_interval_days);
        if reps >= 2 {
            interval = self.cap(self.second_interval_days);
        }
        for _ in 3..=reps {
            interval = self.grow(interval, ease);
        }
        interval
    }
}

/// SM-2 ease change for a review of the given quality.
pub fn ease_adjustment(quality: Quality) -> f64 {
    let miss = f64::from(MAX_QUALITY - quality.value());
    0.1 - miss * (0.08 + miss * 0.02)
}

/// A card without a scheduled date is due immediately.
pub fn is_due(state: &ReviewState, now: DateTime<Utc>) -> bool {
    state.next_review_at.map_or(true, |next| next <= now)
}

/// Computes the state after grading a review at `now`.
pub fn schedule_next(
    config: &SchedulerConfig,
    state: &ReviewState,
    quality: Quality,
    now: DateTime<Utc>,
) -> Result<ReviewState> {
    if !(state.ease_factor.is_finite() && state.ease_factor > 0.0) {
        return Err(ScoringError::InvalidReviewState(format!(
            "ease factor {} for flashcard {}",
            state.ease_factor, state.flashcard_id
        )));
    }

    let ease = if state.is_new() {
        config.default_ease
    } else {
        state.ease_factor
    };
    let mut times_reviewed = state.times_reviewed.saturating_add(1);

    let interval_days = if !quality.is_pass() {
        times_reviewed = 1;
        config.cap(config.fail_interval_days)
    } else {
        match times_reviewed {
            1 => config.cap(config.first_interval_days),
            2 => config.cap(config.second_interval_days),
            n => {
                let previous = if state.interval_days > 0 {
                    state.interval_days
                } else {
                    config.rebuild_interval(n - 1, ease)
                };
                config.grow(previous, ease)
            }
        }
    };

    let ease_factor = (ease + ease_adjustment(quality)).max(config.min_ease);

    debug!(
        "[SM-2 Input] Flashcard {}: Reviews {}, Quality {}, Ease {:.2}, Prev Interval {}d",
        state.flashcard_id,
        state.times_reviewed,
        quality.value(),
        ease,
        state.interval_days
    );

    let next = ReviewState {
        user_id: state.user_id,
        flashcard_id: state.flashcard_id,
        times_reviewed,
        ease_factor,
        interval_days,
        last_reviewed_at: Some(now),
        next_review_at: Some(now + Duration::seconds(i64::from(interval_days) * DAY_SECONDS)),
    };

    info!(
        "[SM-2 Result] Flashcard {}: Ease {:.2} -> {:.2}, Interval {}d -> {}d",
        state.flashcard_id, ease, next.ease_factor, state.interval_days, next.interval_days
    );

    Ok(next)
}

pub fn grade_with_button(
    config: &SchedulerConfig,
    state: &ReviewState,
    button: RecallButton,
    now: DateTime<Utc>,
) -> Result<ReviewState> {
    schedule_next(config, state, button.quality(), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn q(value: i64) -> Quality {
        Quality::new(value).unwrap()
    }

    #[test]
    fn test_first_review() {
        let state = ReviewState::new(1, 10);
        let next = schedule_next(&SchedulerConfig::default(), &state, q(5), now()).unwrap();
        assert_eq!(next.times_reviewed, 1);
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.next_review_at, Some(now() + Duration::days(1)));
        assert_eq!(next.last_reviewed_at, Some(now()));
        assert!((next.ease_factor - 2.6).abs() < 1e-9);
    }

    #[test]
    fn test_second_review() {
        let config = SchedulerConfig::default();
        let first = schedule_next(&config, &ReviewState::new(1, 10), q(4), now()).unwrap();
        let second = schedule_next(&config, &first, q(4), now()).unwrap();
        assert_eq!(second.times_reviewed, 2);
        assert_eq!(second.interval_days, 6);
        assert_eq!(second.next_review_at, Some(now() + Duration::days(6)));
    }

    #[test]
    fn test_third_review_uses_ease() {
        let state = ReviewState {
            times_reviewed: 2,
            ease_factor: 2.5,
            interval_days: 6,
            ..ReviewState::new(1, 10)
        };
        let next = schedule_next(&SchedulerConfig::default(), &state, q(4), now()).unwrap();
        assert_eq!(next.times_reviewed, 3);
        assert_eq!(next.interval_days, 15);
    }

    #[test]
    fn test_quality_below_3_resets() {
        let state = ReviewState {
            times_reviewed: 7,
            ease_factor: 2.8,
            interval_days: 120,
            ..ReviewState::new(1, 10)
        };
        let next = schedule_next(&SchedulerConfig::default(), &state, q(2), now()).unwrap();
        assert_eq!(next.times_reviewed, 1);
        assert_eq!(next.interval_days, 1);
        assert!(next.ease_factor < 2.8);
    }

    #[test]
    fn test_first_review_failure_starts_from_default_ease() {
        let state = ReviewState {
            ease_factor: 1.9,
            ..ReviewState::new(1, 10)
        };
        let next = schedule_next(&SchedulerConfig::default(), &state, q(1), now()).unwrap();
        assert_eq!(next.times_reviewed, 1);
        // 2.5 - 0.54
        assert!((next.ease_factor - 1.96).abs() < 1e-9);
    }

    #[test]
    fn test_ef_floor() {
        let state = ReviewState {
            times_reviewed: 3,
            ease_factor: 1.3,
            interval_days: 4,
            ..ReviewState::new(1, 10)
        };
        let next = schedule_next(&SchedulerConfig::default(), &state, q(0), now()).unwrap();
        assert_eq!(next.ease_factor, 1.3);
    }

    #[test]
    fn test_interval_capped() {
        let state = ReviewState {
            times_reviewed: 9,
            ease_factor: 2.5,
            interval_days: 300,
            ..ReviewState::new(1, 10)
        };
        let next = schedule_next(&SchedulerConfig::default(), &state, q(5), now()).unwrap();
        assert_eq!(next.interval_days, 365);
    }

    #[test]
    fn test_zero_max_interval_falls_back_to_one_day() {
        let config = SchedulerConfig {
            max_interval_days: 0,
            ..SchedulerConfig::default()
        };
        assert!(config.validate().is_err());

        let first = schedule_next(&config, &ReviewState::new(1, 10), q(5), now()).unwrap();
        assert_eq!(first.interval_days, 1);

        let grown = ReviewState {
            times_reviewed: 5,
            ease_factor: 2.5,
            interval_days: 0,
            ..ReviewState::new(1, 10)
        };
        let next = schedule_next(&config, &grown, q(4), now()).unwrap();
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.next_review_at, Some(now() + Duration::days(1)));
    }

    #[test]
    fn test_missing_interval_is_rebuilt() {
        // 1, 6, round(6 * 2.5) = 15, so the 4th review grows 15
        let state = ReviewState {
            times_reviewed: 3,
            ease_factor: 2.5,
            interval_days: 0,
            ..ReviewState::new(1, 10)
        };
        let next = schedule_next(&SchedulerConfig::default(), &state, q(4), now()).unwrap();
        assert_eq!(next.interval_days, 38);
    }

    #[test]
    fn test_invalid_ease_rejected() {
        let state = ReviewState {
            times_reviewed: 2,
            ease_factor: f64::NAN,
            ..ReviewState::new(1, 10)
        };
        let result = schedule_next(&SchedulerConfig::default(), &state, q(4), now());
        assert!(matches!(result, Err(ScoringError::InvalidReviewState(_))));
    }

    #[test]
    fn test_ease_adjustment_is_monotonic() {
        let steps: Vec<f64> = (0..=5).map(|v| ease_adjustment(q(v))).collect();
        assert!(steps.windows(2).all(|w| w[0] < w[1]));
        assert!((ease_adjustment(q(4))).abs() < 1e-9);
    }

    #[test]
    fn test_is_due() {
        let mut state = ReviewState::new(1, 10);
        assert!(is_due(&state, now()));
        state.next_review_at = Some(now() + Duration::days(2));
        assert!(!is_due(&state, now()));
        assert!(is_due(&state, now() + Duration::days(2)));
    }

    #[test]
    fn test_again_button_is_a_lapse() {
        let state = ReviewState {
            times_reviewed: 4,
            ease_factor: 2.5,
            interval_days: 30,
            ..ReviewState::new(1, 10)
        };
        let next =
            grade_with_button(&SchedulerConfig::default(), &state, RecallButton::Again, now())
                .unwrap();
        assert_eq!(next.times_reviewed, 1);
        assert_eq!(next.interval_days, 1);
    }
}
