//! The set of review items owned by one user.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::algorithm::{reset_on_manual_edit, select_next_due, Scheduler};
use crate::clock::Clock;
use crate::error::{Result, SrsError};
use crate::types::{GlobalSrsState, ReviewItem, ScheduleOutcome};

/// Fields a user may change by hand. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct ItemEdit {
    pub content: Option<String>,
    pub long_description: Option<String>,
    pub scheduled_start: Option<DateTime<Utc>>,
}

/// How imported records combine with the items already present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Keep existing items and add the records under fresh ids.
    #[default]
    Append,
    /// Drop every existing item and restore the records with their own ids.
    Replace,
}

/// Counts from merging external records into a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    /// Records whose content clashed and was given a numbered suffix.
    pub renamed: usize,
    /// Items dropped by [`ImportMode::Replace`].
    pub replaced: usize,
}

/// Review items with unique, case-insensitive content.
#[derive(Debug, Clone)]
pub struct ItemCollection {
    items: Vec<ReviewItem>,
    /// `None` once every id has been handed out.
    next_id: Option<u64>,
}

impl Default for ItemCollection {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_id: Some(0),
        }
    }
}

impl ItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from persisted items, trusting their ids.
    pub fn from_items(items: Vec<ReviewItem>) -> Self {
        Self::restore(items, None)
    }

    /// Build a collection from persisted items and the persisted id counter.
    ///
    /// The counter never moves below one past the largest item id, so ids of
    /// removed items stay retired across sessions.
    pub fn restore(items: Vec<ReviewItem>, next_id: Option<u64>) -> Self {
        let next_id = merge_next_id(next_id, &items);
        Self { items, next_id }
    }

    /// The id the next new item will receive.
    pub fn next_id(&self) -> Option<u64> {
        self.next_id
    }

    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ReviewItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&ReviewItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut ReviewItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Create an item that is due immediately.
    pub fn add(
        &mut self,
        content: &str,
        long_description: &str,
        now: DateTime<Utc>,
    ) -> Result<&ReviewItem> {
        let content = self.check_content(content, None)?;
        let id = self.allocate_id()?;
        self.items.push(ReviewItem::new(
            id,
            content,
            long_description.trim().to_string(),
            now,
        ));
        Ok(&self.items[self.items.len() - 1])
    }

    /// Apply a hand edit.
    ///
    /// An edited item keeps at most one banked success so its next grade
    /// cannot jump straight to a long interval.
    pub fn edit(&mut self, id: u64, edit: ItemEdit) -> Result<&ReviewItem> {
        let index = self.index_of(id)?;
        let content = match &edit.content {
            Some(content) => Some(self.check_content(content, Some(id))?),
            None => None,
        };
        if let Some(date) = edit.scheduled_start {
            if date < self.items[index].original_start {
                return Err(SrsError::InvalidDate);
            }
        }

        let item = &mut self.items[index];
        if let Some(content) = content {
            item.content = content;
        }
        if let Some(description) = edit.long_description {
            item.long_description = description.trim().to_string();
        }
        if let Some(date) = edit.scheduled_start {
            item.scheduled_start = date;
        }
        item.correct_count = reset_on_manual_edit(item);
        Ok(&*item)
    }

    pub fn remove(&mut self, id: u64) -> Result<ReviewItem> {
        let index = self.index_of(id)?;
        Ok(self.items.remove(index))
    }

    /// All items due at `now`, earliest first.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<&ReviewItem> {
        let mut due: Vec<&ReviewItem> = self.items.iter().filter(|item| item.is_due(now)).collect();
        due.sort_by_key(|item| item.scheduled_start);
        due
    }

    pub fn next_due(&self, now: DateTime<Utc>) -> Option<&ReviewItem> {
        select_next_due(&self.items, now)
    }

    /// Grade item `id` with a similarity score.
    ///
    /// Fails with [`SrsError::NotFound`] without touching `state` when the id
    /// is unknown.
    pub fn grade<C: Clock>(
        &mut self,
        id: u64,
        similarity: f64,
        state: &mut GlobalSrsState,
        scheduler: &Scheduler<C>,
    ) -> Result<ScheduleOutcome> {
        let item = self.get_mut(id).ok_or(SrsError::NotFound(id))?;
        scheduler.grade(item, similarity, state)
    }

    /// Bring external records into the collection.
    ///
    /// Content that clashes with an item already present (or imported
    /// earlier in the same batch) gets a numbered suffix: "Osmosis (2)",
    /// "Osmosis (3)", and so on. Blank content becomes "Item <id>". Records
    /// keep their schedule and streak; a scheduled start before the original
    /// start is raised to it.
    ///
    /// In [`ImportMode::Append`] every record gets a fresh id. In
    /// [`ImportMode::Replace`] the existing items are dropped and each record
    /// keeps its own id unless an earlier record already claimed it. The id
    /// counter only ever moves forward. Nothing changes if an id cannot be
    /// allocated.
    pub fn import_records(
        &mut self,
        records: Vec<ReviewItem>,
        mode: ImportMode,
    ) -> Result<ImportReport> {
        let mut staged = match mode {
            ImportMode::Append => self.clone(),
            ImportMode::Replace => Self {
                items: Vec::with_capacity(records.len()),
                next_id: self
                    .next_id
                    .and_then(|next| merge_next_id(Some(next), &records)),
            },
        };
        let mut report = ImportReport {
            replaced: match mode {
                ImportMode::Append => 0,
                ImportMode::Replace => self.items.len(),
            },
            ..ImportReport::default()
        };

        for mut record in records {
            let keep_id = mode == ImportMode::Replace && staged.get(record.id).is_none();
            if !keep_id {
                record.id = staged.allocate_id()?;
            }
            let trimmed = record.content.trim();
            let base = if trimmed.is_empty() {
                format!("Item {}", record.id)
            } else {
                trimmed.to_string()
            };
            let content = staged.unique_content(&base);
            if content != base {
                report.renamed += 1;
            }
            record.content = content;
            record.long_description = record.long_description.trim().to_string();
            if record.scheduled_start < record.original_start {
                record.scheduled_start = record.original_start;
            }
            staged.items.push(record);
            report.imported += 1;
        }

        *self = staged;
        info!(
            imported = report.imported,
            renamed = report.renamed,
            replaced = report.replaced,
            "imported review items"
        );
        Ok(report)
    }

    fn allocate_id(&mut self) -> Result<u64> {
        let id = self.next_id.ok_or(SrsError::IdsExhausted)?;
        self.next_id = id.checked_add(1);
        Ok(id)
    }

    fn index_of(&self, id: u64) -> Result<usize> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(SrsError::NotFound(id))
    }

    /// Trimmed content, if it is non-empty and unused by any item but `except`.
    fn check_content(&self, content: &str, except: Option<u64>) -> Result<String> {
        let content = content.trim();
        if content.is_empty() {
            return Err(SrsError::EmptyContent);
        }
        if self.is_taken(content, except) {
            return Err(SrsError::DuplicateContent(content.to_string()));
        }
        Ok(content.to_string())
    }

    fn is_taken(&self, content: &str, except: Option<u64>) -> bool {
        let key = content.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| Some(item.id) != except)
            .any(|item| item.content.trim().to_lowercase() == key)
    }

    /// `base`, or `base (n)` with the smallest n >= 2 that no item uses.
    fn unique_content(&self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut counter = 1u64;
        while self.is_taken(&candidate, None) {
            counter += 1;
            candidate = format!("{base} ({counter})");
        }
        candidate
    }
}

/// Combine a persisted counter (`None` when none was recorded) with the ids
/// actually present. Returns `None` when an item already holds `u64::MAX`.
fn merge_next_id(persisted: Option<u64>, items: &[ReviewItem]) -> Option<u64> {
    let after_items = match items.iter().map(|item| item.id).max() {
        Some(max) => max.checked_add(1)?,
        None => 0,
    };
    Some(persisted.map_or(after_items, |next| next.max(after_items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::types::{Quality, SchedulerSettings};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 2, 12, 0, 0).unwrap()
    }

    fn sample() -> ItemCollection {
        let mut collection = ItemCollection::new();
        collection.add("Photosynthesis", "Light to sugar", now()).unwrap();
        collection.add("Respiration", "Sugar to ATP", now()).unwrap();
        collection
    }

    #[test]
    fn add_assigns_increasing_ids() {
        let collection = sample();
        let ids: Vec<u64> = collection.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn add_trims_and_rejects_blank_content() {
        let mut collection = ItemCollection::new();
        let item = collection.add("  Enzyme ", " Catalyst ", now()).unwrap();
        assert_eq!(item.content, "Enzyme");
        assert_eq!(item.long_description, "Catalyst");
        assert_eq!(collection.add("   ", "x", now()), Err(SrsError::EmptyContent));
    }

    #[test]
    fn add_rejects_duplicate_content_ignoring_case() {
        let mut collection = sample();
        let result = collection.add("photoSYNTHESIS", "again", now());
        assert_eq!(
            result,
            Err(SrsError::DuplicateContent("photoSYNTHESIS".to_string()))
        );
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut collection = sample();
        collection.remove(1).unwrap();
        let item = collection.add("Transpiration", "Water loss", now()).unwrap();
        assert_eq!(item.id, 2);
    }

    #[test]
    fn from_items_continues_after_largest_id() {
        let mut collection =
            ItemCollection::from_items(vec![ReviewItem::new(9, "a".into(), "b".into(), now())]);
        assert_eq!(collection.add("c", "d", now()).unwrap().id, 10);
    }

    #[test]
    fn remove_unknown_id_is_not_found() {
        let mut collection = sample();
        assert_eq!(collection.remove(42), Err(SrsError::NotFound(42)));
    }

    #[test]
    fn edit_collapses_streak_and_keeps_original_start() {
        let mut collection = sample();
        collection.get_mut(0).unwrap().correct_count = 5;
        let later = now() + Duration::days(10);

        let item = collection
            .edit(
                0,
                ItemEdit {
                    content: Some("Photosynthesis (C3)".into()),
                    long_description: None,
                    scheduled_start: Some(later),
                },
            )
            .unwrap();
        assert_eq!(item.content, "Photosynthesis (C3)");
        assert_eq!(item.long_description, "Light to sugar");
        assert_eq!(item.scheduled_start, later);
        assert_eq!(item.original_start, now());
        assert_eq!(item.correct_count, 1);

        let untouched = collection.edit(1, ItemEdit::default()).unwrap();
        assert_eq!(untouched.correct_count, 0);
    }

    #[test]
    fn edit_checks_uniqueness_against_other_items() {
        let mut collection = sample();
        let same = ItemEdit {
            content: Some("PHOTOSYNTHESIS".into()),
            ..Default::default()
        };
        assert!(collection.edit(0, same).is_ok());

        let clash = ItemEdit {
            content: Some("respiration".into()),
            ..Default::default()
        };
        assert_eq!(
            collection.edit(0, clash),
            Err(SrsError::DuplicateContent("respiration".into()))
        );
    }

    #[test]
    fn edit_rejects_date_before_creation() {
        let mut collection = sample();
        let edit = ItemEdit {
            scheduled_start: Some(now() - Duration::days(1)),
            ..Default::default()
        };
        assert_eq!(collection.edit(0, edit), Err(SrsError::InvalidDate));
    }

    #[test]
    fn due_lists_earliest_first() {
        let mut collection = sample();
        collection.add("Glycolysis", "Glucose split", now()).unwrap();
        collection.get_mut(0).unwrap().scheduled_start = now() + Duration::days(1);
        collection.get_mut(1).unwrap().scheduled_start = now() - Duration::days(1);
        collection.get_mut(2).unwrap().scheduled_start = now() - Duration::days(3);

        let due: Vec<u64> = collection.due(now()).iter().map(|i| i.id).collect();
        assert_eq!(due, vec![2, 1]);
        assert_eq!(collection.next_due(now()).map(|i| i.id), Some(2));
    }

    #[test]
    fn grade_unknown_id_leaves_state_alone() {
        let mut collection = sample();
        let scheduler = Scheduler::new(SchedulerSettings::default(), FixedClock::new(now()));
        let mut state = GlobalSrsState::default();
        state.current_interval_days = 7;

        let result = collection.grade(99, 0.9, &mut state, &scheduler);
        assert_eq!(result, Err(SrsError::NotFound(99)));
        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.current_interval_days, 7);
    }

    #[test]
    fn grade_updates_item_in_place() {
        let mut collection = sample();
        let scheduler = Scheduler::new(SchedulerSettings::default(), FixedClock::new(now()));
        let mut state = GlobalSrsState::default();

        let outcome = collection.grade(1, 0.9, &mut state, &scheduler).unwrap();
        assert_eq!(outcome.quality, Quality::Good);
        let item = collection.get(1).unwrap();
        assert_eq!(item.correct_count, 1);
        assert_eq!(item.scheduled_start, now() + Duration::days(1));
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn import_renames_clashing_content_and_renumbers() {
        let mut collection = sample();
        let mut existing = ReviewItem::new(0, "respiration".into(), "dup".into(), now());
        existing.correct_count = 2;
        let mut fresh = ReviewItem::new(0, "Fermentation".into(), "No oxygen".into(), now());
        fresh.scheduled_start = now() + Duration::days(4);
        fresh.correct_count = 2;
        let repeated = ReviewItem::new(5, "FERMENTATION".into(), "twice".into(), now());
        let blank = ReviewItem::new(6, " ".into(), "none".into(), now());

        let report = collection
            .import_records(vec![existing, fresh, repeated, blank], ImportMode::Append)
            .unwrap();
        assert_eq!(
            report,
            ImportReport {
                imported: 4,
                renamed: 2,
                replaced: 0
            }
        );
        let contents: Vec<(u64, &str)> = collection
            .items()
            .iter()
            .map(|item| (item.id, item.content.as_str()))
            .collect();
        assert_eq!(
            contents,
            vec![
                (0, "Photosynthesis"),
                (1, "Respiration"),
                (2, "respiration (2)"),
                (3, "Fermentation"),
                (4, "FERMENTATION (2)"),
                (5, "Item 5"),
            ]
        );
        let imported = collection.get(3).unwrap();
        assert_eq!(imported.correct_count, 2);
        assert_eq!(imported.scheduled_start, now() + Duration::days(4));
        assert_eq!(collection.get(2).unwrap().correct_count, 2);
    }

    #[test]
    fn import_keeps_counting_past_taken_suffixes() {
        let mut collection = sample();
        collection.add("Respiration (2)", "taken", now()).unwrap();
        let records = vec![ReviewItem::new(0, "respiration".into(), "x".into(), now())];

        collection.import_records(records, ImportMode::Append).unwrap();
        assert_eq!(collection.get(3).unwrap().content, "respiration (3)");
    }

    #[test]
    fn import_raises_schedule_to_original_start() {
        let mut collection = ItemCollection::new();
        let mut record = ReviewItem::new(0, "Osmosis".into(), "Water".into(), now());
        record.scheduled_start = now() - Duration::days(2);

        collection.import_records(vec![record], ImportMode::Append).unwrap();
        assert_eq!(collection.get(0).unwrap().scheduled_start, now());
    }

    #[test]
    fn replace_import_restores_record_ids() {
        let mut collection = sample();
        collection.add("Glycolysis", "Glucose split", now()).unwrap();
        let records = vec![
            ReviewItem::new(7, "Osmosis".into(), "Water".into(), now()),
            ReviewItem::new(1, "Diffusion".into(), "Gradient".into(), now()),
            ReviewItem::new(7, "osmosis".into(), "Again".into(), now()),
        ];

        let report = collection.import_records(records, ImportMode::Replace).unwrap();
        assert_eq!(
            report,
            ImportReport {
                imported: 3,
                renamed: 1,
                replaced: 3
            }
        );
        let contents: Vec<(u64, &str)> = collection
            .items()
            .iter()
            .map(|item| (item.id, item.content.as_str()))
            .collect();
        assert_eq!(
            contents,
            vec![(7, "Osmosis"), (1, "Diffusion"), (8, "osmosis (2)")]
        );
        assert_eq!(collection.add("Active transport", "ATP", now()).unwrap().id, 9);
    }

    #[test]
    fn replace_import_never_moves_counter_back() {
        let mut collection = sample();
        collection.add("Glycolysis", "Glucose split", now()).unwrap();
        let records = vec![ReviewItem::new(0, "Osmosis".into(), "Water".into(), now())];

        collection.import_records(records, ImportMode::Replace).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.next_id(), Some(3));
    }

    #[test]
    fn restore_honours_counter_past_removed_items() {
        let mut collection = sample();
        collection.remove(1).unwrap();
        let restored = ItemCollection::restore(collection.items().to_vec(), collection.next_id());
        assert_eq!(restored.next_id(), Some(2));

        let stale = ItemCollection::restore(collection.into_items(), Some(0));
        assert_eq!(stale.next_id(), Some(1));
    }

    #[test]
    fn largest_possible_id_does_not_overflow() {
        let mut collection = ItemCollection::from_items(vec![ReviewItem::new(
            u64::MAX,
            "Last".into(),
            "id".into(),
            now(),
        )]);
        assert_eq!(collection.next_id(), None);
        assert_eq!(collection.add("More", "x", now()), Err(SrsError::IdsExhausted));

        let records = vec![ReviewItem::new(0, "Other".into(), "y".into(), now())];
        assert_eq!(
            collection.import_records(records, ImportMode::Append),
            Err(SrsError::IdsExhausted)
        );
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn last_id_is_handed_out_once() {
        let mut collection = ItemCollection::restore(Vec::new(), Some(u64::MAX));
        assert_eq!(collection.add("Last", "x", now()).unwrap().id, u64::MAX);
        assert_eq!(collection.add("Later", "y", now()), Err(SrsError::IdsExhausted));
    }
}
