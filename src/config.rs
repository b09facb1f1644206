// src/config.rs

use crate::constants::DEFAULT_RATING;
use crate::error::{Result, ScoringError};
use crate::rating::RatingStrategy;
use crate::scheduler::SchedulerConfig;
use crate::tiers::{TierIssue, TierTable};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Process-wide scoring configuration.
///
/// Loaded once at startup and handed out by reference; nothing in the crate
/// mutates it after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Rating given to a score on its first interaction.
    pub default_rating: i64,
    pub rating: RatingStrategy,
    pub scheduler: SchedulerConfig,
    pub tiers: TierTable,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            default_rating: DEFAULT_RATING,
            rating: RatingStrategy::default(),
            scheduler: SchedulerConfig::default(),
            tiers: TierTable::default(),
        }
    }
}

impl ScoringConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: ScoringConfig = serde_json::from_str(raw)?;
        config.checked()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading scoring config from {:?}", path);
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Rejects structurally broken settings and reports tier data problems.
    ///
    /// Tier issues are returned rather than raised so a bad table never blocks grading.
    pub fn validate(&self) -> Result<Vec<TierIssue>> {
        if self.default_rating < 0 {
            return Err(ScoringError::Config(format!(
                "default rating must not be negative, got {}",
                self.default_rating
            )));
        }
        self.rating.validate()?;
        self.scheduler.validate()?;
        let issues = self.tiers.validate();
        for issue in &issues {
            warn!("[Tier Config] {}", issue);
        }
        Ok(issues)
    }

    fn checked(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::RatingPolicy;

    #[test]
    fn test_default_config_is_valid() {
        let issues = ScoringConfig::default().validate().unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = ScoringConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ScoringConfig::default());
        assert_eq!(config.rating.name(), "session_batch");
    }

    #[test]
    fn test_partial_override() {
        let config = ScoringConfig::from_json_str(
            r#"{
                "rating": {"strategy": "per_attempt", "max_change": 25},
                "scheduler": {"max_interval_days": 180},
                "tiers": [
                    {"name": "Bronze", "min": 0, "max": 999},
                    {"name": "Silver", "min": 1000, "description": "Past the basics"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.rating.name(), "per_attempt");
        assert_eq!(config.scheduler.max_interval_days, 180);
        assert_eq!(config.scheduler.min_ease, 1.3);
        assert_eq!(config.tiers.tiers().len(), 2);
    }

    #[test]
    fn test_misconfigured_tiers_are_not_fatal() {
        let config = ScoringConfig::from_json_str(
            r#"{"tiers": [{"name": "A", "min": 0, "max": 10}, {"name": "B", "min": 20}]}"#,
        )
        .unwrap();
        assert_eq!(config.validate().unwrap().len(), 1);
    }

    #[test]
    fn test_bad_scheduler_rejected() {
        let result = ScoringConfig::from_json_str(r#"{"scheduler": {"min_ease": 0.0}}"#);
        assert!(matches!(result, Err(ScoringError::Config(_))));
    }

    #[test]
    fn test_default_rating_override() {
        let config = ScoringConfig::from_json_str(r#"{"default_rating": 1500}"#).unwrap();
        assert_eq!(config.default_rating, 1500);
        assert_eq!(config.scheduler, SchedulerConfig::default());
    }

    #[test]
    fn test_negative_default_rating_rejected() {
        let result = ScoringConfig::from_json_str(r#"{"default_rating": -10}"#);
        assert!(matches!(result, Err(ScoringError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = ScoringConfig::from_path("/nonexistent/scoring.json");
        assert!(matches!(result, Err(ScoringError::Io(_))));
    }
}
