//! Bounded, timestamped event feed shown in the desk terminal.
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// One line of the terminal feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub at: NaiveTime,
    pub message: String,
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// FIFO that keeps only the most recent `capacity` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventJournal {
    capacity: usize,
    entries: VecDeque<JournalEntry>,
}

impl EventJournal {
    /// A journal retaining at most `capacity` entries (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a message stamped `at`, evicting the oldest entry when full.
    pub fn push(&mut self, at: NaiveTime, message: impl Into<String>) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(JournalEntry {
            at,
            message: message.into(),
        });
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&JournalEntry> {
        self.entries.back()
    }

    /// Rendered lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nine_am() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn evicts_oldest_first() {
        let mut journal = EventJournal::with_capacity(16);
        for i in 0..20 {
            journal.push(nine_am(), format!("event {i}"));
        }
        assert_eq!(journal.len(), 16);
        assert_eq!(journal.iter().next().unwrap().message, "event 4");
        assert_eq!(journal.latest().unwrap().message, "event 19");
    }

    #[test]
    fn renders_clock_prefix() {
        let mut journal = EventJournal::with_capacity(2);
        journal.push(
            NaiveTime::from_hms_opt(13, 5, 9).unwrap(),
            "Incoming alert: Sleigh navigation API returning 404",
        );
        assert_eq!(
            journal.lines(),
            vec!["[13:05:09] Incoming alert: Sleigh navigation API returning 404".to_string()]
        );
    }

    #[test]
    fn zero_capacity_still_keeps_latest() {
        let mut journal = EventJournal::with_capacity(0);
        journal.push(nine_am(), "a");
        journal.push(nine_am(), "b");
        assert_eq!(journal.capacity(), 1);
        assert_eq!(journal.lines(), vec!["[09:00:00] b".to_string()]);
    }
}
