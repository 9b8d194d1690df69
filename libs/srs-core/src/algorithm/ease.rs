//! Ease-factor scheduling.
//!
//! A single ease factor is shared by every item. Each review is graded from a
//! similarity score and the item's timing, then the ease factor and the item's
//! consecutive-success count are updated and the next review date is derived
//! from them.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, SrsError};
use crate::types::{
    GlobalSrsState, Quality, ReviewItem, ScheduleOutcome, EARLY_RATIO, GOOD_SIMILARITY,
    HARD_SIMILARITY, MAX_EASE, MIN_EASE, ONE_DAY_MS,
};

const AGAIN_EASE_DELTA: f64 = -0.20;
const HARD_EASE_DELTA: f64 = -0.15;
const GOOD_EASE_DELTA: f64 = 0.10;

/// Clamp an ease factor into its valid range.
pub fn clamp_ease(ease: f64) -> f64 {
    ease.clamp(MIN_EASE, MAX_EASE)
}

/// How far `now` is past the original start, relative to the planned gap.
///
/// Items whose scheduled start is not after their original start have no
/// planned interval and report a ratio of 1.0.
pub fn interval_ratio(item: &ReviewItem, now: DateTime<Utc>) -> f64 {
    let planned_ms = (item.scheduled_start - item.original_start).num_milliseconds();
    if planned_ms <= 0 {
        return 1.0;
    }
    let elapsed_since_planned_ms = (now - item.scheduled_start).num_milliseconds();
    (elapsed_since_planned_ms + planned_ms) as f64 / planned_ms as f64
}

/// Grade a review from its similarity score and interval ratio.
pub fn quality_for(similarity: f64, ratio: f64) -> Quality {
    if similarity >= GOOD_SIMILARITY {
        // On-time and late recalls both count; only early ones are downgraded.
        if ratio < EARLY_RATIO {
            Quality::Hard
        } else {
            Quality::Good
        }
    } else if similarity >= HARD_SIMILARITY {
        Quality::Hard
    } else {
        Quality::Again
    }
}

/// Grade a review of `item` performed at `now`.
///
/// `similarity` must be finite and within [0, 1].
pub fn classify_quality(item: &ReviewItem, similarity: f64, now: DateTime<Utc>) -> Result<Quality> {
    validate_similarity(similarity)?;
    Ok(quality_for(similarity, interval_ratio(item, now)))
}

pub(crate) fn validate_similarity(similarity: f64) -> Result<()> {
    if similarity.is_finite() && (0.0..=1.0).contains(&similarity) {
        Ok(())
    } else {
        Err(SrsError::InvalidSimilarity(similarity))
    }
}

/// Whole days elapsed since the item's last review event, at least 1.
///
/// The last event is the previous scheduled date once the item has a
/// successful review banked, and its creation otherwise.
pub fn current_interval_days(item: &ReviewItem, now: DateTime<Utc>) -> i64 {
    let since = if item.correct_count > 0 {
        item.scheduled_start
    } else {
        item.original_start
    };
    let days = ((now - since).num_milliseconds() as f64 / ONE_DAY_MS as f64).round() as i64;
    days.max(1)
}

/// Apply a graded review to `item` and the shared `state`.
///
/// Reads `state.current_interval_days`, which the caller refreshes with
/// [`current_interval_days`] beforehand.
///
/// Fails with [`SrsError::DateOutOfRange`], leaving `item` and `state`
/// untouched, when the next review date cannot be represented.
pub fn update_schedule(
    item: &mut ReviewItem,
    quality: Quality,
    state: &mut GlobalSrsState,
    minimum_one_day: bool,
    now: DateTime<Utc>,
) -> Result<ScheduleOutcome> {
    let (correct_count, ease_delta) = match quality {
        Quality::Again => (0, AGAIN_EASE_DELTA),
        Quality::Hard => (item.correct_count.saturating_add(1), HARD_EASE_DELTA),
        Quality::Good => (item.correct_count.saturating_add(1), GOOD_EASE_DELTA),
    };
    let ease_factor = clamp_ease(state.ease_factor + ease_delta);

    let mut interval_days = match correct_count {
        1 => 1,
        2 => 3,
        _ => (state.current_interval_days as f64 * ease_factor).round() as i64,
    };
    if minimum_one_day && interval_days < 1 {
        interval_days = 1;
    }
    // Never schedule into the past.
    let interval_days = interval_days.max(0);

    let next_scheduled_start = interval_days
        .checked_mul(ONE_DAY_MS)
        .and_then(Duration::try_milliseconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or(SrsError::DateOutOfRange(interval_days))?;

    item.scheduled_start = next_scheduled_start;
    item.correct_count = correct_count;
    state.ease_factor = ease_factor;

    Ok(ScheduleOutcome {
        quality,
        next_scheduled_start,
        ease_factor,
        current_interval_days: state.current_interval_days,
        interval_days,
        correct_count,
    })
}

/// The due item with the earliest scheduled start, if any.
pub fn select_next_due(items: &[ReviewItem], now: DateTime<Utc>) -> Option<&ReviewItem> {
    items
        .iter()
        .filter(|item| item.is_due(now))
        .min_by_key(|item| item.scheduled_start)
}

/// Correct count to keep after a hand edit of the item.
pub fn reset_on_manual_edit(item: &ReviewItem) -> u32 {
    if item.correct_count > 0 {
        1
    } else {
        0
    }
}
