//! Core identifier newtypes with smart constructors.
//!
//! Process and thread ids are the tracer's 4-hex-digit labels (`00c8`), not OS
//! handles. They are stored as `u16` and always rendered zero-padded, so the
//! textual form round-trips exactly.

use serde::{Serialize, Serializer};
use std::fmt;

/// Position of an entry in the parsed entry sequence.
///
/// Dense and strictly increasing in emission order: the entry with id `n` is
/// stored at index `n` of [`LogParseResult::entries`](crate::model::LogParseResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(usize);

impl EntryId {
    /// Create a new EntryId from a raw 0-based value.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw 0-based index value.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl From<usize> for EntryId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process identifier as printed by the tracer (e.g. `00c8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(u16);

impl ProcessId {
    /// Smart constructor: accepts exactly four hex digits.
    pub fn parse(raw: &str) -> Result<Self, InvalidProcessId> {
        parse_hex_label(raw)
            .map(Self)
            .ok_or_else(|| InvalidProcessId::Malformed(raw.to_string()))
    }

    /// Numeric value of the id.
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl From<u16> for ProcessId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

impl Serialize for ProcessId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Thread identifier as printed by the tracer (e.g. `00cc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(u16);

impl ThreadId {
    /// Smart constructor: accepts exactly four hex digits.
    pub fn parse(raw: &str) -> Result<Self, InvalidThreadId> {
        parse_hex_label(raw)
            .map(Self)
            .ok_or_else(|| InvalidThreadId::Malformed(raw.to_string()))
    }

    /// Numeric value of the id.
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl From<u16> for ThreadId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

impl Serialize for ThreadId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Key identifying one thread across the whole log.
pub type ThreadKey = (ProcessId, ThreadId);

fn parse_hex_label(raw: &str) -> Option<u16> {
    if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(raw, 16).ok()
}

// ===== Error Types =====

/// Rejected process id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidProcessId {
    /// Not exactly four hex digits.
    #[error("Process ID must be four hex digits, got '{0}'")]
    Malformed(String),
}

/// Rejected thread id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidThreadId {
    /// Not exactly four hex digits.
    #[error("Thread ID must be four hex digits, got '{0}'")]
    Malformed(String),
}

// ===== Tests =====
