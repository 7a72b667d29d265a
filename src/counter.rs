//! # Job Counter Module
//!
//! Persists the last issued job number in a small JSON file
//! (`{ "last": 41 }`) and hands out the next one each time the intake modal
//! is opened.
//!
//! Increments are serialized inside the process and every write goes through
//! a temporary file that is renamed over the counter file, so a crash never
//! leaves a truncated file behind. Separate processes sharing one counter file
//! can still race; job numbers are only unique per process.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CounterState {
    last: u64,
}

/// File-backed, monotonically increasing job number source
#[derive(Debug)]
pub struct JobCounter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JobCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last issued job number, or 0 when the file is missing or unreadable
    pub fn current(&self) -> u64 {
        read_state(&self.path).last
    }

    /// Issue the next job number
    ///
    /// Persistence failures are logged and do not stop the number from being
    /// issued.
    pub fn next(&self) -> u64 {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let next = read_state(&self.path).last.saturating_add(1);
        if let Err(e) = write_state(&self.path, &CounterState { last: next }) {
            warn!("Failed to persist job counter to {}: {e}", self.path.display());
        }

        debug!("Issued job number {next}");
        next
    }

    /// [`JobCounter::next`] for async callers
    ///
    /// The lock and the file I/O run on the blocking pool so runtime workers
    /// are never parked on them.
    pub async fn issue(self: &Arc<Self>) -> anyhow::Result<u64> {
        let counter = Arc::clone(self);
        tokio::task::spawn_blocking(move || counter.next())
            .await
            .context("job counter task failed")
    }
}

fn read_state(path: &Path) -> CounterState {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return CounterState::default(),
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("Ignoring malformed job counter {}: {e}", path.display());
        CounterState::default()
    })
}

fn write_state(path: &Path, state: &CounterState) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(temp.as_file_mut(), state)?;
    temp.as_file_mut().write_all(b"\n")?;
    temp.persist(path)?;
    Ok(())
}
