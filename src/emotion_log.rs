//! # Emotion Log
//!
//! Append-only CSV history of every emotion the player acted on:
//!
//! ```text
//! timestamp,emotion
//! 2026-10-16T14:32:07.120394,happy
//! 2026-10-16T14:32:07.161850,happy
//! ```
//!
//! The file is opened, written and closed on every append. Nothing is
//! buffered between calls, so a crash never loses more than the row being
//! written.

use crate::emotion::Emotion;
use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header row written once when the file is created.
pub const HEADER: &str = "timestamp,emotion";

/// Timestamp layout of the first column: ISO-8601, local time, microseconds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// One row of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub emotion: Emotion,
}

/// Writer (and reader) for the emotion CSV file.
#[derive(Debug, Clone)]
pub struct EmotionLog {
    path: PathBuf,
}

impl EmotionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `emotion` stamped with the current local time.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened for append or written.
    pub fn append(&self, emotion: Emotion) -> Result<()> {
        self.append_at(Local::now().naive_local(), emotion)
    }

    /// Appends `emotion` with an explicit timestamp.
    pub fn append_at(&self, timestamp: NaiveDateTime, emotion: Emotion) -> Result<()> {
        let is_new = !self.path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open emotion log {} for append", self.path.display()))?;

        let mut rows = String::new();
        if is_new {
            rows.push_str(HEADER);
            rows.push('\n');
        }
        rows.push_str(&format!("{},{}\n", timestamp.format(TIMESTAMP_FORMAT), emotion.label()));

        file.write_all(rows.as_bytes())
            .with_context(|| format!("Failed to write to emotion log {}", self.path.display()))?;
        Ok(())
    }

    /// Reads every entry back, skipping the header.
    ///
    /// A missing file is an empty history.
    pub fn entries(&self) -> Result<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read emotion log {}", self.path.display()))?;

        let mut entries = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || (index == 0 && line == HEADER) {
                continue;
            }
            let entry = parse_row(line).with_context(|| format!("{}:{}: malformed row '{line}'", self.path.display(), index + 1))?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

fn parse_row(line: &str) -> Result<LogEntry> {
    let Some((timestamp, label)) = line.split_once(',') else {
        bail!("expected two comma-separated columns");
    };
    let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S"))
        .context("invalid timestamp")?;
    let emotion = label.parse::<Emotion>()?;
    Ok(LogEntry { timestamp, emotion })
}

/// Aggregated view of a log for the `history` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub counts: BTreeMap<Emotion, usize>,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}

impl LogSummary {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Emotion with the most rows; ties go to the earlier one in [`Emotion::ALL`].
    pub fn dominant(&self) -> Option<Emotion> {
        Emotion::ALL
            .into_iter()
            .filter_map(|e| self.counts.get(&e).map(|&count| (e, count)))
            .filter(|&(_, count)| count > 0)
            .fold(None, |best: Option<(Emotion, usize)>, (e, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((e, count)),
            })
            .map(|(e, _)| e)
    }
}

/// Counts entries per emotion and records the covered time span.
pub fn summarize(entries: &[LogEntry]) -> LogSummary {
    let mut summary = LogSummary::default();
    for entry in entries {
        *summary.counts.entry(entry.emotion).or_insert(0) += 1;
        summary.first = Some(summary.first.map_or(entry.timestamp, |t| t.min(entry.timestamp)));
        summary.last = Some(summary.last.map_or(entry.timestamp, |t| t.max(entry.timestamp)));
    }
    summary
}
