//! Spaced repetition scheduling.

pub mod ease;

pub use ease::{
    clamp_ease, classify_quality, current_interval_days, interval_ratio, quality_for,
    reset_on_manual_edit, select_next_due, update_schedule,
};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::types::{GlobalSrsState, Quality, ReviewItem, ScheduleOutcome, SchedulerSettings};

/// Scheduler bound to a clock and a policy.
///
/// Each grading call reads the clock once, so the interval ratio, the elapsed
/// interval and the next review date all agree on "now".
#[derive(Debug, Clone)]
pub struct Scheduler<C = SystemClock> {
    settings: SchedulerSettings,
    clock: C,
}

impl Default for Scheduler<SystemClock> {
    fn default() -> Self {
        Self::new(SchedulerSettings::default(), SystemClock)
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn new(settings: SchedulerSettings, clock: C) -> Self {
        Self { settings, clock }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Grade a review from a similarity score and reschedule the item.
    ///
    /// An invalid score is rejected before anything is mutated.
    pub fn grade(
        &self,
        item: &mut ReviewItem,
        similarity: f64,
        state: &mut GlobalSrsState,
    ) -> Result<ScheduleOutcome> {
        let now = self.clock.now();
        let quality = classify_quality(item, similarity, now)?;
        self.apply(item, quality, state, now)
    }

    /// Reschedule the item with a quality chosen by the caller.
    pub fn grade_with_quality(
        &self,
        item: &mut ReviewItem,
        quality: Quality,
        state: &mut GlobalSrsState,
    ) -> Result<ScheduleOutcome> {
        let now = self.clock.now();
        self.apply(item, quality, state, now)
    }

    /// The earliest due item at the current instant.
    pub fn next_due<'a>(&self, items: &'a [ReviewItem]) -> Option<&'a ReviewItem> {
        select_next_due(items, self.clock.now())
    }

    fn apply(
        &self,
        item: &mut ReviewItem,
        quality: Quality,
        state: &mut GlobalSrsState,
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome> {
        let previous_interval = state.current_interval_days;
        state.current_interval_days = current_interval_days(item, now);
        let outcome =
            match update_schedule(item, quality, state, self.settings.minimum_one_day, now) {
                Ok(outcome) => outcome,
                Err(err) => {
                    state.current_interval_days = previous_interval;
                    warn!(item_id = item.id, error = %err, "could not reschedule item");
                    return Err(err);
                }
            };
        debug!(
            item_id = item.id,
            quality = quality.as_str(),
            interval_days = outcome.interval_days,
            ease_factor = outcome.ease_factor,
            "rescheduled item"
        );
        Ok(outcome)
    }
}
