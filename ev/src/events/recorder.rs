//! Timeline Recorder - persists timeline entries to a JSONL file

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::bus::EventBus;
use super::types::TimelineEntry;

/// One line of a recorded timeline
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedEntry {
    /// Wall-clock time the entry was written
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: TimelineEntry,
}

impl RecordedEntry {
    /// Stamp an entry with the current time
    pub fn new(entry: TimelineEntry) -> Self {
        Self {
            timestamp: Utc::now(),
            entry,
        }
    }
}

/// Writes timeline entries to a JSONL file, one per line
pub struct TimelineRecorder {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl TimelineRecorder {
    /// Create (or truncate) the output file, creating parent directories
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(?path, "TimelineRecorder::create: called");
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create timeline directory")?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .context(format!("Failed to open {}", path.display()))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Path being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry
    pub fn write_entry(&mut self, entry: &TimelineEntry) -> Result<()> {
        let json = serde_json::to_string(&RecordedEntry::new(entry.clone()))?;
        writeln!(self.writer, "{}", json)?;
        self.written += 1;
        Ok(())
    }

    /// Consume entries until the bus closes, then flush
    ///
    /// Returns the number of entries written.
    pub async fn run(mut self, mut rx: broadcast::Receiver<TimelineEntry>) -> usize {
        debug!(path = ?self.path, "TimelineRecorder::run: starting");
        loop {
            match rx.recv().await {
                Ok(entry) => {
                    if let Err(e) = self.write_entry(&entry) {
                        error!(error = %e, "TimelineRecorder: failed to write entry");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "TimelineRecorder: lagged behind, missed entries");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("TimelineRecorder: channel closed, shutting down");
                    break;
                }
            }
        }

        if let Err(e) = self.writer.flush() {
            error!(error = %e, "TimelineRecorder: failed to flush");
        }
        self.written
    }
}

/// Subscribe a recorder to `bus` and run it on a background task
///
/// Subscription happens before this returns, so no entry emitted afterwards
/// is missed. The task ends once every handle to the bus is dropped.
pub fn spawn_timeline_recorder(path: impl AsRef<Path>, bus: &EventBus) -> Result<JoinHandle<usize>> {
    let recorder = TimelineRecorder::create(path)?;
    let rx = bus.subscribe();
    Ok(tokio::spawn(recorder.run(rx)))
}

/// Read a recorded timeline back
pub fn read_timeline(path: impl AsRef<Path>) -> Result<Vec<RecordedEntry>> {
    let path = path.as_ref();
    debug!(?path, "read_timeline: called");
    let file = File::open(path).context(format!("Failed to open {}", path.display()))?;
    let mut entries = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: RecordedEntry =
            serde_json::from_str(&line).context(format!("Invalid timeline entry on line {}", n + 1))?;
        entries.push(entry);
    }
    Ok(entries)
}
