//! Call-tree construction.
//!
//! Each `(pid, tid)` has at most one open call; the chain of open calls is
//! recovered through the `parent` links already stored on the entries, so no
//! separate stack is kept.

use crate::model::{EntryId, LogEntry, ThreadKey};
use std::collections::HashMap;
use tracing::warn;

/// Per-thread call nesting for one parse.
#[derive(Debug, Default)]
pub struct CallTreeBuilder {
    open: HashMap<ThreadKey, EntryId>,
    last_emitted: HashMap<ThreadKey, EntryId>,
}

impl CallTreeBuilder {
    /// Builder with no open calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost open call on `key`; the parent of anything emitted there now.
    pub fn open_call(&self, key: ThreadKey) -> Option<EntryId> {
        self.open.get(&key).copied()
    }

    /// `call` was emitted on `key` and is now the innermost open call.
    pub fn enter(&mut self, key: ThreadKey, call: EntryId) {
        self.open.insert(key, call);
    }

    /// Close the open call on `key` whose callsite matches the return.
    ///
    /// Walks outwards from the innermost open call. On a match the call gets
    /// its `return` link, is marked inlinable when it was the last entry
    /// emitted on this thread, and its parent becomes the innermost open call.
    /// Returns the parent to give the return entry: the matched call, or the
    /// innermost open call when nothing matched (nothing is closed then).
    pub fn leave(
        &mut self,
        entries: &mut [LogEntry],
        key: ThreadKey,
        callsite: Option<&str>,
        ret: EntryId,
    ) -> Option<EntryId> {
        let innermost = self.open_call(key);
        let Some(matched) = self.find_open(entries, innermost, callsite) else {
            if innermost.is_some() {
                warn!(
                    return_id = %ret,
                    callsite = callsite.unwrap_or("<none>"),
                    "return does not match any open call"
                );
            }
            return innermost;
        };

        let inlinable = self.last_emitted.get(&key) == Some(&matched);
        let parent = match entries.get_mut(matched.get()).and_then(LogEntry::as_call_mut) {
            Some(call) => {
                call.return_id = Some(ret);
                call.inlinable = inlinable;
                call.parent
            }
            None => None,
        };

        match parent {
            Some(parent) => self.open.insert(key, parent),
            None => self.open.remove(&key),
        };
        Some(matched)
    }

    /// Record `id` as the latest entry emitted on `key`.
    pub fn emitted(&mut self, key: ThreadKey, id: EntryId) {
        self.last_emitted.insert(key, id);
    }

    fn find_open(
        &self,
        entries: &[LogEntry],
        innermost: Option<EntryId>,
        callsite: Option<&str>,
    ) -> Option<EntryId> {
        let mut cursor = innermost;
        while let Some(id) = cursor {
            let call = entries.get(id.get())?.as_call()?;
            if call.callsite.as_deref() == callsite {
                return Some(id);
            }
            cursor = call.parent;
        }
        None
    }
}
