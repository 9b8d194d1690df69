//! Core spaced repetition library shared by the recall front ends.
//!
//! Provides:
//! - Ease-factor scheduling with similarity-based quality grading
//! - Item collection with case-insensitive unique prompts
//! - Similarity oracle for free-text recall (Levenshtein distance)
//! - JSON snapshot persistence
//! - Shared types (ReviewItem, GlobalSrsState, Quality, etc.)

pub mod algorithm;
pub mod clock;
pub mod collection;
pub mod error;
pub mod matching;
pub mod store;
pub mod types;

pub use algorithm::{
    classify_quality, current_interval_days, interval_ratio, reset_on_manual_edit,
    select_next_due, update_schedule, Scheduler,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use collection::{ImportMode, ImportReport, ItemCollection, ItemEdit};
pub use error::{OracleError, Result, SrsError, StoreError};
pub use matching::{sanitize_similarity, LevenshteinOracle, SimilarityOracle};
pub use store::Snapshot;
pub use types::{GlobalSrsState, Quality, ReviewItem, ScheduleOutcome, SchedulerSettings};
