// Audit log - append-only, most recent entry first

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One immutable record of an accepted intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    /// Who is responsible, chosen by the rule that fired
    pub actor: String,
    pub action: String,
    pub detail: String,
}

impl LogEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        actor: impl Into<String>,
        action: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            actor: actor.into(),
            action: action.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog {
    entries: VecDeque<LogEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh log holding only `entry`, as left behind by a reset
    pub fn starting_with(entry: LogEntry) -> Self {
        let mut log = Self::new();
        log.prepend(entry);
        log
    }

    /// Entries are only ever added at the front; nothing is edited or removed
    pub(crate) fn prepend(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Most recent first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + '_ {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a AuditLog {
    type Item = &'a LogEntry;
    type IntoIter = std::collections::vec_deque::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
