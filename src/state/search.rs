//! Text search over parsed entries.
//!
//! Search is a circular scan: starting at some index it walks the entries in
//! one direction, wraps at the end and stops after visiting each index once.
//! Entries rejected by the filter are skipped.

use crate::model::LogEntry;
use crate::state::filter::{passes, EntryPredicate};

// ===== SearchQuery =====

/// Validated search query. Never empty.
/// Smart constructor enforces non-empty invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    folded: String,
}

impl SearchQuery {
    /// Smart constructor: validates query is non-empty.
    /// Returns None if query is empty or whitespace-only.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            let folded = raw.to_lowercase();
            Some(Self { raw, folded })
        }
    }

    /// The query as typed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Case-insensitive substring test.
    pub fn is_found_in(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.folded)
    }
}

// ===== SearchDirection =====

/// Scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    /// Towards higher indices.
    #[default]
    Next,
    /// Towards lower indices.
    Prev,
}

impl SearchDirection {
    /// Where a scan without an explicit start begins: the first index going
    /// forward, the last going backward.
    pub fn default_start(self, len: usize) -> usize {
        match self {
            SearchDirection::Next => 0,
            SearchDirection::Prev => len.saturating_sub(1),
        }
    }

    /// Start index for continuing past a previous hit at `index`.
    pub fn start_after(self, index: usize, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.step(index, 1, len)
    }

    fn step(self, start: usize, distance: usize, len: usize) -> usize {
        let start = start % len;
        let distance = distance % len;
        match self {
            SearchDirection::Next => (start + distance) % len,
            SearchDirection::Prev => (start + len - distance) % len,
        }
    }
}

// ===== SearchOptions =====

/// Search knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Also match the raw text of `Text` entries.
    pub include_text: bool,
}

// ===== Search Execution =====

/// Returns true if any searchable field of `entry` contains the query.
///
/// Messages are searched by channel, logger and message; calls by module,
/// function, callsite and arguments; returns by module, function, callsite
/// and return value. The message class is never searched.
pub fn entry_matches(entry: &LogEntry, query: &SearchQuery, options: SearchOptions) -> bool {
    let found = |field: &str| query.is_found_in(field);
    let found_opt = |field: &Option<String>| field.as_deref().is_some_and(found);

    match entry {
        LogEntry::Message(msg) => found(&msg.channel) || found(&msg.logger) || found(&msg.message),
        LogEntry::Call(call) => {
            found(&call.module)
                || found(&call.func)
                || found_opt(&call.callsite)
                || call
                    .args
                    .as_ref()
                    .is_some_and(|args| args.iter().any(|arg| found(arg)))
        }
        LogEntry::Return(ret) => {
            found(&ret.module)
                || found(&ret.func)
                || found_opt(&ret.callsite)
                || found_opt(&ret.retval)
        }
        LogEntry::Text(text) => options.include_text && found(&text.text),
    }
}

/// Find the next entry matching `query`.
///
/// The scan begins at `start` (inclusive; defaults to
/// [`SearchDirection::default_start`]) and wraps around once. Returns the
/// index of the first matching entry that also passes `filter`.
pub fn find(
    entries: &[LogEntry],
    query: &SearchQuery,
    direction: SearchDirection,
    start: Option<usize>,
    filter: Option<&dyn EntryPredicate>,
    options: SearchOptions,
) -> Option<usize> {
    let len = entries.len();
    if len == 0 {
        return None;
    }
    let start = start.unwrap_or_else(|| direction.default_start(len));

    (0..len)
        .map(|distance| direction.step(start, distance, len))
        .find(|&index| {
            let entry = &entries[index];
            passes(filter, entries, entry) && entry_matches(entry, query, options)
        })
}

// ===== Tests =====

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
