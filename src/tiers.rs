// src/tiers.rs

use crate::constants::*;
use crate::error::{Result, ScoringError};
use crate::models::Tier;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Problems in tier reference data. Never fatal; lookups fall back to the lowest tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierIssue {
    FirstTierNotAtZero { name: String, min: i64 },
    InvertedRange { name: String },
    Gap { below: String, above: String },
    Overlap { first: String, second: String },
    BoundedTopTier { name: String },
    NoMatch { rating: i64 },
    MultipleMatches { rating: i64, count: usize },
}

impl fmt::Display for TierIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierIssue::FirstTierNotAtZero { name, min } => {
                write!(f, "lowest tier '{}' starts at {} instead of 0", name, min)
            }
            TierIssue::InvertedRange { name } => write!(f, "tier '{}' has max below min", name),
            TierIssue::Gap { below, above } => {
                write!(f, "gap between tiers '{}' and '{}'", below, above)
            }
            TierIssue::Overlap { first, second } => {
                write!(f, "tiers '{}' and '{}' overlap", first, second)
            }
            TierIssue::BoundedTopTier { name } => {
                write!(f, "top tier '{}' has an upper bound", name)
            }
            TierIssue::NoMatch { rating } => write!(f, "no tier contains rating {}", rating),
            TierIssue::MultipleMatches { rating, count } => {
                write!(f, "{} tiers contain rating {}", count, rating)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierLookup<'a> {
    pub tier: &'a Tier,
    /// Set when the table is misconfigured and `tier` is the fallback.
    pub issue: Option<TierIssue>,
}

/// Ordered, non-empty set of tiers, loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tier>", into = "Vec<Tier>")]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl TierTable {
    pub fn new(mut tiers: Vec<Tier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(ScoringError::EmptyTierTable);
        }
        tiers.sort_by_key(|t| t.min);
        Ok(TierTable { tiers })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn lowest(&self) -> &Tier {
        &self.tiers[0]
    }

    pub fn get(&self, name: &str) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    /// Returns the tier containing `rating`.
    pub fn tier_for(&self, rating: i64) -> Result<TierLookup<'_>> {
        if rating < 0 {
            return Err(ScoringError::NegativeRating(rating));
        }

        let mut matches = self.tiers.iter().filter(|t| t.contains(rating));
        let first = matches.next();
        let extra = matches.count();

        let issue = match (first, extra) {
            (Some(tier), 0) => return Ok(TierLookup { tier, issue: None }),
            (None, _) => TierIssue::NoMatch { rating },
            (Some(_), n) => TierIssue::MultipleMatches {
                rating,
                count: n + 1,
            },
        };

        warn!(
            "[Tier Config] {}; falling back to '{}'",
            issue,
            self.lowest().name
        );
        Ok(TierLookup {
            tier: self.lowest(),
            issue: Some(issue),
        })
    }

    pub fn next_tier(&self, tier: &Tier) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.min > tier.min)
    }

    /// Rating points still needed to enter the next tier; `None` at the top.
    pub fn points_to_next_tier(&self, rating: i64) -> Result<Option<i64>> {
        let lookup = self.tier_for(rating)?;
        Ok(self
            .next_tier(lookup.tier)
            .map(|next| (next.min - rating).max(0)))
    }

    /// Checks that tiers are contiguous from 0 with an open-ended top.
    pub fn validate(&self) -> Vec<TierIssue> {
        let mut issues = Vec::new();

        let first = self.lowest();
        if first.min != 0 {
            issues.push(TierIssue::FirstTierNotAtZero {
                name: first.name.clone(),
                min: first.min,
            });
        }

        for tier in &self.tiers {
            if matches!(tier.max, Some(max) if max < tier.min) {
                issues.push(TierIssue::InvertedRange {
                    name: tier.name.clone(),
                });
            }
        }

        for pair in self.tiers.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            match lower.max {
                None => issues.push(TierIssue::Overlap {
                    first: lower.name.clone(),
                    second: upper.name.clone(),
                }),
                Some(max) if upper.min <= max => issues.push(TierIssue::Overlap {
                    first: lower.name.clone(),
                    second: upper.name.clone(),
                }),
                Some(max) if upper.min > max + 1 => issues.push(TierIssue::Gap {
                    below: lower.name.clone(),
                    above: upper.name.clone(),
                }),
                Some(_) => {}
            }
        }

        if let Some(top) = self.tiers.last() {
            if !top.is_unbounded() {
                issues.push(TierIssue::BoundedTopTier {
                    name: top.name.clone(),
                });
            }
        }

        issues
    }
}

impl Default for TierTable {
    fn default() -> Self {
        TierTable {
            tiers: DEFAULT_TIERS
                .iter()
                .map(|&(name, min, max, description)| Tier {
                    name: name.to_string(),
                    min,
                    max,
                    description: description.to_string(),
                })
                .collect(),
        }
    }
}

impl TryFrom<Vec<Tier>> for TierTable {
    type Error = ScoringError;
    fn try_from(tiers: Vec<Tier>) -> Result<Self> {
        TierTable::new(tiers)
    }
}

impl From<TierTable> for Vec<Tier> {
    fn from(table: TierTable) -> Self {
        table.tiers
    }
}

/// Position of `rating` inside `tier` as a percentage in `0..=100`.
///
/// The open-ended top tier counts a fixed window above its minimum as full.
pub fn progress_within_tier(rating: i64, tier: &Tier) -> f64 {
    let span = match tier.max {
        Some(max) => max - tier.min,
        None => TOP_TIER_PROGRESS_WINDOW,
    };
    if span <= 0 {
        return 100.0;
    }
    let progress = (rating - tier.min) as f64 / span as f64 * 100.0;
    progress.clamp(0.0, 100.0)
}
