//! Core types for the review scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds in one day.
pub const ONE_DAY_MS: i64 = 86_400_000;

/// Ease factor given to a fresh collection.
pub const INITIAL_EASE: f64 = 2.5;

/// Lower bound of the ease factor.
pub const MIN_EASE: f64 = 1.1;

/// Upper bound of the ease factor.
pub const MAX_EASE: f64 = 3.0;

/// Similarity at or above which a recall counts as correct.
pub const GOOD_SIMILARITY: f64 = 0.85;

/// Similarity at or above which a recall counts as partially correct.
pub const HARD_SIMILARITY: f64 = 0.5;

/// Interval ratio below which a correct recall was too early to count as Good.
pub const EARLY_RATIO: f64 = 0.8;

/// Interval ratio above which a correct recall is considered late.
pub const LATE_RATIO: f64 = 1.5;

/// Graded outcome of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Again,
    Hard,
    Good,
}

impl Quality {
    /// Convert to numeric value (1-3).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
        }
    }

    /// Create from numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
        }
    }
}

/// One flashcard/concept under review.
///
/// Records written by the browser side panel (`start`, `myOriginalStart`,
/// `myCorrectCount`) are read through aliases; output always uses the
/// camelCase names below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub id: u64,
    /// Short prompt shown to the user.
    #[serde(default)]
    pub content: String,
    /// Reference answer used for grading.
    #[serde(default)]
    pub long_description: String,
    /// Due at or after this instant.
    #[serde(alias = "start")]
    pub scheduled_start: DateTime<Utc>,
    /// When the item was created. Never changes.
    #[serde(alias = "myOriginalStart")]
    pub original_start: DateTime<Utc>,
    /// Consecutive successful reviews since the last reset.
    #[serde(default, alias = "myCorrectCount")]
    pub correct_count: u32,
}

impl ReviewItem {
    /// Create a new item that is reviewable immediately.
    pub fn new(id: u64, content: String, long_description: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            content,
            long_description,
            scheduled_start: now,
            original_start: now,
            correct_count: 0,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_start <= now
    }
}

/// Process-wide scheduler state. The ease factor is shared by every item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSrsState {
    pub ease_factor: f64,
    /// Recomputed from elapsed time before each review.
    #[serde(skip)]
    pub current_interval_days: i64,
}

impl Default for GlobalSrsState {
    fn default() -> Self {
        Self {
            ease_factor: INITIAL_EASE,
            current_interval_days: 0,
        }
    }
}

impl GlobalSrsState {
    pub fn with_ease(ease_factor: f64) -> Self {
        Self {
            ease_factor,
            current_interval_days: 0,
        }
    }
}

/// Scheduling policy knobs.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Never schedule an item less than one day out.
    pub minimum_one_day: bool,
    /// Score substituted when the similarity oracle fails.
    pub fallback_similarity: f64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            minimum_one_day: false,
            fallback_similarity: 0.5,
        }
    }
}

/// Result of grading an item, as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOutcome {
    pub quality: Quality,
    pub next_scheduled_start: DateTime<Utc>,
    pub ease_factor: f64,
    pub current_interval_days: i64,
    pub interval_days: i64,
    pub correct_count: u32,
}
