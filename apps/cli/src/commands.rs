//! Command execution against the persisted collection.

use std::io::Write;

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use srs_core::store::{self, Snapshot};
use srs_core::{
    sanitize_similarity, Clock, GlobalSrsState, ImportMode, ItemCollection, ItemEdit,
    LevenshteinOracle, ReviewItem, ScheduleOutcome, Scheduler, SimilarityOracle,
};
use tracing::debug;

use crate::cli::Command;
use crate::config::Config;

/// Run one command, saving the collection if it changed.
pub fn execute<C: Clock, W: Write>(
    command: &Command,
    config: &Config,
    clock: C,
    out: &mut W,
) -> anyhow::Result<()> {
    let path = &config.store_path;
    let snapshot = store::load(path)
        .with_context(|| format!("failed to load collection from {}", path.display()))?;
    let (mut collection, mut state) = snapshot.into_parts();
    let scheduler = Scheduler::new(config.settings.clone(), clock);

    let changed = run_command(command, &mut collection, &mut state, &scheduler, out)?;

    if changed {
        store::save(path, &Snapshot::from_parts(&collection, &state))
            .with_context(|| format!("failed to save collection to {}", path.display()))?;
    }
    Ok(())
}

fn run_command<C: Clock, W: Write>(
    command: &Command,
    collection: &mut ItemCollection,
    state: &mut GlobalSrsState,
    scheduler: &Scheduler<C>,
    out: &mut W,
) -> anyhow::Result<bool> {
    match command {
        Command::Add {
            content,
            description,
        } => {
            let item = collection.add(content, description, scheduler.now())?;
            writeln!(out, "Added #{}: {}", item.id, item.content)?;
            Ok(true)
        }
        Command::List { due } => {
            let now = scheduler.now();
            let items: Vec<&ReviewItem> = if *due {
                collection.due(now)
            } else {
                collection.items().iter().collect()
            };
            if items.is_empty() {
                writeln!(out, "No items.")?;
            }
            for item in items {
                write_item_line(out, item, now)?;
            }
            Ok(false)
        }
        Command::Next => {
            match scheduler.next_due(collection.items()) {
                Some(item) => {
                    writeln!(out, "#{} {}", item.id, item.content)?;
                }
                None => {
                    writeln!(out, "Nothing to review now.")?;
                }
            }
            Ok(false)
        }
        Command::Review { id, recall } => {
            let recall = recall.join(" ");
            let reference = collection
                .get(*id)
                .map(|item| item.long_description.clone())
                .with_context(|| format!("item not found: {id}"))?;
            let score = sanitize_similarity(
                LevenshteinOracle.similarity(&reference, &recall),
                scheduler.settings().fallback_similarity,
            );
            debug!(id, score, "scored recall");
            let outcome = collection.grade(*id, score, state, scheduler)?;
            writeln!(out, "Similarity: {score:.2}")?;
            writeln!(out, "Reference: {reference}")?;
            write_outcome(out, &outcome)?;
            Ok(true)
        }
        Command::Grade { id, score } => {
            let outcome = collection.grade(*id, *score, state, scheduler)?;
            write_outcome(out, &outcome)?;
            Ok(true)
        }
        Command::Rate { id, quality } => {
            let item = collection
                .get_mut(*id)
                .with_context(|| format!("item not found: {id}"))?;
            let outcome = scheduler.grade_with_quality(item, (*quality).into(), state)?;
            write_outcome(out, &outcome)?;
            Ok(true)
        }
        Command::Edit {
            id,
            content,
            description,
            date,
        } => {
            let scheduled_start = date.as_deref().map(parse_date).transpose()?;
            let edit = ItemEdit {
                content: content.clone(),
                long_description: description.clone(),
                scheduled_start,
            };
            let item = collection.edit(*id, edit)?;
            writeln!(out, "Updated #{}: {}", item.id, item.content)?;
            Ok(true)
        }
        Command::Delete { id } => {
            let item = collection.remove(*id)?;
            writeln!(out, "Deleted #{}: {}", item.id, item.content)?;
            Ok(true)
        }
        Command::Import { file, replace } => {
            let records = store::read_items(file)
                .with_context(|| format!("failed to read items from {}", file.display()))?;
            let mode = if *replace {
                ImportMode::Replace
            } else {
                ImportMode::Append
            };
            let report = collection.import_records(records, mode)?;
            if *replace {
                writeln!(out, "Replaced {} item(s).", report.replaced)?;
            }
            writeln!(
                out,
                "Imported {} item(s), renamed {}.",
                report.imported, report.renamed
            )?;
            Ok(*replace || report.imported > 0)
        }
        Command::Export { file } => {
            store::export_items(file, collection.items())
                .with_context(|| format!("failed to export items to {}", file.display()))?;
            writeln!(out, "Exported {} item(s).", collection.len())?;
            Ok(false)
        }
        Command::Stats => {
            let now = scheduler.now();
            writeln!(out, "Items: {}", collection.len())?;
            writeln!(out, "Due now: {}", collection.due(now).len())?;
            writeln!(out, "Ease factor: {:.2}", state.ease_factor)?;
            Ok(false)
        }
    }
}

/// Parse an RFC 3339 timestamp or a bare date (midnight UTC).
pub fn parse_date(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    bail!("invalid date {value:?}: expected RFC 3339 or YYYY-MM-DD")
}

fn write_item_line<W: Write>(out: &mut W, item: &ReviewItem, now: DateTime<Utc>) -> std::io::Result<()> {
    let marker = if item.is_due(now) { "*" } else { " " };
    writeln!(
        out,
        "{marker} #{:<4} {}  n={}  {}",
        item.id,
        item.scheduled_start.format("%Y-%m-%d %H:%M"),
        item.correct_count,
        item.content
    )
}

fn write_outcome<W: Write>(out: &mut W, outcome: &ScheduleOutcome) -> std::io::Result<()> {
    writeln!(
        out,
        "Quality: {} ({})",
        outcome.quality.as_str(),
        outcome.quality.to_value()
    )?;
    writeln!(
        out,
        "Next review: {}",
        outcome.next_scheduled_start.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(out, "Ease factor: {:.2}", outcome.ease_factor)?;
    writeln!(
        out,
        "Interval: {} day(s), {} day(s) since last review",
        outcome.interval_days, outcome.current_interval_days
    )
}
