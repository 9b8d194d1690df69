//! Command-line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use srs_core::Quality;

#[derive(Debug, Parser)]
#[command(name = "recall", version, about = "Spaced repetition review from the terminal")]
pub struct Cli {
    /// Collection file (overrides RECALL_STORE).
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Never schedule a review less than one day out.
    #[arg(long, global = true)]
    pub min_one_day: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Add a new item, due immediately.
    Add {
        /// Short prompt shown at review time.
        content: String,
        /// Reference answer.
        description: String,
    },
    /// List items.
    List {
        /// Only show items that are due now.
        #[arg(long)]
        due: bool,
    },
    /// Show the next item to review.
    Next,
    /// Answer an item from memory and reschedule it.
    Review {
        id: u64,
        /// What you remember about the item.
        #[arg(required = true, num_args = 1..)]
        recall: Vec<String>,
    },
    /// Reschedule an item with an externally computed similarity score.
    Grade {
        id: u64,
        #[arg(allow_hyphen_values = true)]
        score: f64,
    },
    /// Reschedule an item with an explicit quality.
    Rate { id: u64, quality: QualityArg },
    /// Edit an item by hand.
    Edit {
        id: u64,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Next review date, RFC 3339 or YYYY-MM-DD.
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete an item.
    Delete { id: u64 },
    /// Add items from a JSON array file. Clashing content gets a numbered suffix.
    Import {
        file: PathBuf,
        /// Discard the current items and restore the file's items with their ids.
        #[arg(long)]
        replace: bool,
    },
    /// Write all items to a JSON array file.
    Export { file: PathBuf },
    /// Show collection statistics.
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    Again,
    Hard,
    Good,
}

impl From<QualityArg> for Quality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Again => Quality::Again,
            QualityArg::Hard => Quality::Hard,
            QualityArg::Good => Quality::Good,
        }
    }
}
