//! Append-only activity log.
//!
//! Records every identity, upload, share, download, delete and export handled by
//! [`crate::share::SecureShare`], successful or not. Records name files,
//! key ids and principals. They never contain key material or passwords.
//! Supports pluggable sinks for forwarding records to files or other stores.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    KeyGenerated,
    Upload,
    Share,
    Download,
    Delete,
    KeyExported,
}

/// Outcome of the recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Success,
    Failed,
}

/// A permanent record of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// File name for uploads, shares and downloads, key id otherwise.
    pub subject: String,
    /// The principal that performed the operation.
    pub user: String,
    pub status: ActivityStatus,
    pub timestamp: DateTime<Utc>,
}

impl ActivityRecord {
    /// A record stamped with the current time.
    pub fn now(kind: ActivityKind, subject: &str, user: &str, status: ActivityStatus) -> Self {
        Self {
            kind,
            subject: subject.to_string(),
            user: user.to_string(),
            status,
            timestamp: Utc::now(),
        }
    }
}

/// Receives a copy of every record appended to an [`ActivityLog`].
pub trait ActivitySink: Send {
    /// Called once per record, in append order. Failures are the sink's
    /// own concern and never reach the caller of `ActivityLog::append`.
    fn append(&mut self, record: &ActivityRecord);
}

/// In-memory, append-only, newest last.
#[derive(Default)]
pub struct ActivityLog {
    records: Vec<ActivityRecord>,
    sinks: Vec<Box<dyn ActivitySink>>,
}

impl std::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLog")
            .field("records", &self.records)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl ActivityLog {
    /// An empty log with no sinks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a forward sink. Only records appended afterwards reach it.
    pub fn add_sink(&mut self, sink: Box<dyn ActivitySink>) {
        self.sinks.push(sink);
    }

    /// Append a record and forward it to every sink.
    pub fn append(&mut self, record: ActivityRecord) {
        for sink in self.sinks.iter_mut() {
            sink.append(&record);
        }
        self.records.push(record);
    }

    /// Number of records held in memory.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, ActivityRecord> {
        self.records.iter()
    }

    /// Records newest first, as an activity feed shows them.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &ActivityRecord> {
        self.records.iter().rev().take(limit)
    }
}

// ---------------------------------------------------------------------------
// Built-in sink: file
// ---------------------------------------------------------------------------

/// Writes records as JSON lines. Creates the file if it doesn't exist;
/// appends if it does.
pub struct FileActivitySink {
    file: std::fs::File,
}

impl FileActivitySink {
    /// Open (or create) `path` for appending.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl ActivitySink for FileActivitySink {
    fn append(&mut self, record: &ActivityRecord) {
        let written = serde_json::to_string(record)
            .map_err(std::io::Error::from)
            .and_then(|line| writeln!(self.file, "{line}"))
            .and_then(|()| self.file.flush());
        if let Err(e) = written {
            warn!("activity sink write failed: {e}");
        }
    }
}
