//! The value handed back by a parse.

use crate::model::{CallEntry, EntryId, LogEntry, LogProcess, LogThread, ProcessId, ThreadKey};
use serde::Serialize;

/// Processes and entries reconstructed from one log.
///
/// Owned entirely by the caller. `entries[n].id() == EntryId::new(n)` for every `n`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogParseResult {
    /// Processes in discovery order.
    pub processes: Vec<LogProcess>,
    /// Entries in emission order.
    pub entries: Vec<LogEntry>,
}

impl LogParseResult {
    /// Returns true when nothing recognisable was parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by id.
    pub fn entry(&self, id: EntryId) -> Option<&LogEntry> {
        self.entries.get(id.get())
    }

    /// Call entry by id; `None` if the id is out of range or not a call.
    pub fn call(&self, id: EntryId) -> Option<&CallEntry> {
        self.entry(id).and_then(LogEntry::as_call)
    }

    /// Process by id.
    pub fn process(&self, id: ProcessId) -> Option<&LogProcess> {
        self.processes.iter().find(|process| process.id == id)
    }

    /// Thread by `(pid, tid)`.
    pub fn thread(&self, (pid, tid): ThreadKey) -> Option<&LogThread> {
        self.process(pid).and_then(|process| process.thread(tid))
    }
}
