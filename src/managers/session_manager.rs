//! Session Manager for figdesk.
//!
//! Persists the restorable part of the tab set as a small JSON file and
//! restores it at startup. Writes are coalesced: every change re-arms a
//! debounce deadline and only the latest snapshot is written once the
//! deadline passes. Persistence is best-effort; failures are logged and
//! never propagate to the coordinator.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::services::url_classifier::is_restorable;
use crate::types::errors::SessionError;
use crate::types::session::{PersistedSnapshot, RestorePlan};

/// Trait defining session persistence operations.
pub trait SessionManagerTrait {
    fn save_session(&self, data: &PersistedSnapshot) -> Result<(), SessionError>;
    fn load_session(&self) -> Result<Option<PersistedSnapshot>, SessionError>;
    fn has_session(&self) -> bool;
    fn clear_session(&self) -> Result<(), SessionError>;
    fn schedule(&mut self, data: PersistedSnapshot);
    fn poll(&mut self, now: Instant) -> bool;
    fn flush(&mut self) -> bool;
    fn next_deadline(&self) -> Option<Instant>;
}

/// Filters a loaded snapshot down to the tabs that may be reopened.
///
/// Returns `None` when nothing survives, so the caller falls back to a
/// single default tab.
pub fn plan_restore(snapshot: &PersistedSnapshot) -> Option<RestorePlan> {
    let tabs: Vec<_> = snapshot
        .tabs
        .iter()
        .filter(|t| is_restorable(&t.url))
        .cloned()
        .collect();
    let first = tabs.first()?.id.clone();
    let active_tab_id = snapshot
        .active_tab_id
        .as_ref()
        .filter(|id| tabs.iter().any(|t| &t.id == *id))
        .cloned()
        .unwrap_or(first);
    Some(RestorePlan { tabs, active_tab_id })
}

/// Snapshot file plus a write-coalescing debounce queue.
pub struct SessionManager {
    path: PathBuf,
    debounce: Duration,
    pending: Option<PersistedSnapshot>,
    deadline: Option<Instant>,
    writes: u64,
}

impl SessionManager {
    pub fn new(path: PathBuf, debounce: Duration) -> Self {
        Self {
            path,
            debounce,
            pending: None,
            deadline: None,
            writes: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of snapshot writes attempted so far.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Like `schedule`, with an explicit clock reading.
    pub fn schedule_at(&mut self, data: PersistedSnapshot, now: Instant) {
        self.pending = Some(data);
        self.deadline = Some(now + self.debounce);
    }

    /// Loads and filters the snapshot; any failure means "no state".
    pub fn restore(&self) -> Option<RestorePlan> {
        match self.load_session() {
            Ok(Some(snapshot)) => plan_restore(&snapshot),
            Ok(None) => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable tab snapshot");
                None
            }
        }
    }

    fn write_pending(&mut self) -> bool {
        self.deadline = None;
        let Some(data) = self.pending.take() else {
            return false;
        };
        self.writes += 1;
        match self.save_session(&data) {
            Ok(()) => {
                debug!(path = %self.path.display(), tabs = data.tabs.len(), "tab snapshot written");
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to write tab snapshot");
            }
        }
        true
    }
}

impl SessionManagerTrait for SessionManager {
    /// Serializes the snapshot and replaces the file wholesale.
    fn save_session(&self, data: &PersistedSnapshot) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Reads the snapshot; a missing file is `Ok(None)`.
    fn load_session(&self) -> Result<Option<PersistedSnapshot>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&content)?;
        Ok(Some(snapshot))
    }

    fn has_session(&self) -> bool {
        self.path.exists()
    }

    fn clear_session(&self) -> Result<(), SessionError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Queues `data`, replacing anything pending, and re-arms the deadline.
    fn schedule(&mut self, data: PersistedSnapshot) {
        self.schedule_at(data, Instant::now());
    }

    /// Writes the pending snapshot if its deadline has passed.
    fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => self.write_pending(),
            _ => false,
        }
    }

    /// Writes the pending snapshot immediately.
    fn flush(&mut self) -> bool {
        self.write_pending()
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.write_pending();
    }
}
