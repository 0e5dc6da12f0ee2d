use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::errors::{ErrorKind, Result};

#[derive(Clone, Debug)]
pub struct HistoryEntry {
    line: String,
    timestamp: Option<DateTime<Local>>,
}

impl HistoryEntry {
    pub fn line(&self) -> &str {
        &self.line
    }
}

/// Bounded list of the most recent command lines.
#[derive(Debug)]
pub struct HistoryState {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    /// Sequence number of the oldest retained entry.
    base: usize,
}

impl HistoryState {
    pub fn with_capacity(capacity: usize) -> HistoryState {
        let capacity = capacity.max(1);
        HistoryState {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            base: 1,
        }
    }

    pub fn push(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        self.entries.push_back(HistoryEntry {
            line: line.to_string(),
            timestamp: Some(Local::now()),
        });
        self.truncate();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sets the number of retained entries, dropping the oldest ones at once.
    ///
    /// A size of zero is ignored.
    pub fn set_capacity(&mut self, size: usize) {
        if size == 0 {
            return;
        }
        self.capacity = size;
        self.truncate();
    }

    /// Entries with their sequence numbers, oldest first.
    pub fn enumerate(&self) -> impl Iterator<Item = (usize, &HistoryEntry)> {
        let base = self.base;
        self.entries
            .iter()
            .enumerate()
            .map(move |(i, e)| (base + i, e))
    }

    /// Lines as printed by the `history` builtin, restricted to the last `last` entries.
    pub fn display(&self, last: Option<usize>) -> Vec<String> {
        let skip = last.map_or(0, |n| self.len().saturating_sub(n));
        self.enumerate()
            .skip(skip)
            .map(|(number, entry)| {
                let time = entry
                    .timestamp
                    .as_ref()
                    .map(|t| t.format("%a %R").to_string())
                    .unwrap_or_else(|| "??".to_string());
                format!("{:04}: {}: {}", number, time, entry.line)
            })
            .collect()
    }

    /// Performs history expansion on a line starting with `!`.
    ///
    /// !! -> the previous command
    /// !n -> the command with sequence number n
    /// !-n -> the nth previous command
    /// !string -> the most recent command starting with string
    ///
    /// Anything after the event designator is appended to the expansion.
    /// Returns `None` if the line does not start with an event designator.
    pub fn expand(&self, line: &str) -> Result<Option<String>> {
        let line = line.trim_start();
        if !line.starts_with('!') || line.len() == 1 {
            return Ok(None);
        }

        let (designator, rest) = match line.find(char::is_whitespace) {
            Some(i) => line.split_at(i),
            None => (line, ""),
        };
        let event = &designator[1..];

        let entry = if event == "!" {
            self.entries.back()
        } else {
            match event.parse::<isize>() {
                Ok(0) => None,
                Ok(n) if n > 0 => (n as usize)
                    .checked_sub(self.base)
                    .and_then(|i| self.entries.get(i)),
                Ok(n) => self
                    .len()
                    .checked_sub(n.unsigned_abs())
                    .and_then(|i| self.entries.get(i)),
                Err(_) => self.entries.iter().rev().find(|e| e.line.starts_with(event)),
            }
        };

        match entry {
            Some(entry) => Ok(Some(format!("{}{}", entry.line, rest))),
            None => Err(ErrorKind::EventNotFound(designator.to_string()).into()),
        }
    }

    fn truncate(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.base += 1;
        }
    }
}
