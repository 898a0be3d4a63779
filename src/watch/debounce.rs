//! Pure debouncer: timing and per-path deduplication only.
//!
//! Raw notify events are noisy - editors fire bursts of create/modify/
//! remove for a single save. The debouncer collects events into a
//! path-keyed map and releases a batch once a quiet window has passed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub(super) const DEBOUNCE_MS: u64 = 200;

/// What happened to a path within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

pub(super) struct Debouncer {
    /// Path → ChangeKind (dedup is free via map key uniqueness)
    changes: HashMap<PathBuf, ChangeKind>,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: HashMap::new(),
            last_event: None,
        }
    }

    /// Record a notify event. Metadata-only modifications and editor
    /// temp files are dropped: they would otherwise trigger endless
    /// rebuild loops.
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }

            match (self.changes.get(path).copied(), kind) {
                // A new file appeared then vanished within the window: no-op
                (Some(ChangeKind::Created), ChangeKind::Removed) => {
                    self.changes.remove(path);
                }
                // Tasks rescan their sources anyway, so the latest kind wins
                _ => {
                    self.changes.insert(path.clone(), kind);
                }
            }
            self.last_event = Some(Instant::now());
        }
    }

    /// Take the batch if the quiet window has elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<HashMap<PathBuf, ChangeKind>> {
        let last_event = self.last_event?;
        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return None;
        }
        self.last_event = None;
        let changes = std::mem::take(&mut self.changes);
        if changes.is_empty() { None } else { Some(changes) }
    }

    /// How long the consumer may sleep before the batch could be ready.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };
        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
