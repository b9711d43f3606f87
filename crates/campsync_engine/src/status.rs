//! Read models consumed by the presentation layer.
//!
//! The UI never touches the store directly; these snapshots are the whole
//! surface it sees.

use crate::item::QueueKind;
use crate::queue::QueueStore;

/// A simple "N queued" badge for one queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueBadge {
    /// Human label of the queue.
    pub label: &'static str,
    /// Number of items currently queued.
    pub count: usize,
}

/// One health row per queue for the diagnostics view.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueHealth {
    /// Stable queue key.
    pub key: &'static str,
    /// Human label.
    pub label: &'static str,
    /// Number of items currently queued.
    pub count: usize,
    /// Number of items flagged as conflicts.
    pub conflicts: usize,
    /// Earliest pending automatic retry (epoch ms), if any.
    pub next_retry: Option<u64>,
    /// Most recent failure message seen in this queue.
    pub last_error: Option<String>,
}

impl QueueStore {
    /// Returns a badge per queue, including empty ones.
    #[must_use]
    pub fn badges(&self) -> Vec<QueueBadge> {
        QueueKind::ALL
            .into_iter()
            .map(|kind| QueueBadge {
                label: kind.label(),
                count: self.load(kind).len(),
            })
            .collect()
    }

    /// Returns one health row per queue, including empty ones.
    #[must_use]
    pub fn health(&self) -> Vec<QueueHealth> {
        QueueKind::ALL
            .into_iter()
            .map(|kind| {
                let items = self.load(kind);
                QueueHealth {
                    key: kind.storage_key(),
                    label: kind.label(),
                    count: items.len(),
                    conflicts: items.iter().filter(|i| i.conflict).count(),
                    next_retry: items
                        .iter()
                        .filter(|i| !i.conflict)
                        .filter_map(|i| i.next_attempt_at)
                        .min(),
                    last_error: items
                        .iter()
                        .rev()
                        .find_map(|i| i.last_error.clone()),
                }
            })
            .collect()
    }
}
