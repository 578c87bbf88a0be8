//! Entry filters.
//!
//! Navigation and search accept any [`EntryPredicate`]. [`LogFilter`] is the
//! viewer's own filter; plain closures work too.

use crate::model::{LogEntry, MessageClass, ProcessId, ThreadKey};
use std::collections::HashSet;

/// Decides whether an entry takes part in a view or a search.
pub trait EntryPredicate {
    /// Returns true if `entry` passes, given the full entry sequence for
    /// back-reference lookups.
    fn matches(&self, entries: &[LogEntry], entry: &LogEntry) -> bool;
}

impl<F> EntryPredicate for F
where
    F: Fn(&LogEntry) -> bool,
{
    fn matches(&self, _entries: &[LogEntry], entry: &LogEntry) -> bool {
        self(entry)
    }
}

/// Apply an optional filter; no filter accepts everything.
pub(crate) fn passes(
    filter: Option<&dyn EntryPredicate>,
    entries: &[LogEntry],
    entry: &LogEntry,
) -> bool {
    filter.is_none_or(|filter| filter.matches(entries, entry))
}

/// Show/hide switches of the log view.
///
/// The default shows everything except returns whose call is inlinable
/// (those render on the call's own row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    /// Show `Text` entries.
    pub show_text: bool,
    /// Show `Call`/`Return` entries.
    pub show_relay: bool,
    /// Message classes to hide.
    pub hidden_classes: HashSet<MessageClass>,
    /// Restrict to these processes (`None` for all).
    pub processes: Option<HashSet<ProcessId>>,
    /// Restrict to these threads (`None` for all threads of the selected processes).
    pub threads: Option<HashSet<ThreadKey>>,
    /// Hide the return of an inlinable call.
    pub hide_inlined_returns: bool,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            show_text: true,
            show_relay: true,
            hidden_classes: HashSet::new(),
            processes: None,
            threads: None,
            hide_inlined_returns: true,
        }
    }
}

impl LogFilter {
    /// Filter that lets every entry through.
    pub fn everything() -> Self {
        Self {
            hide_inlined_returns: false,
            ..Self::default()
        }
    }

    /// Flip visibility of one message class.
    pub fn toggle_class(&mut self, class: MessageClass) {
        if !self.hidden_classes.remove(&class) {
            self.hidden_classes.insert(class);
        }
    }

    /// Only show the given processes.
    pub fn with_processes(mut self, pids: impl IntoIterator<Item = ProcessId>) -> Self {
        self.processes = Some(pids.into_iter().collect());
        self
    }

    /// Only show the given threads.
    pub fn with_threads(mut self, keys: impl IntoIterator<Item = ThreadKey>) -> Self {
        self.threads = Some(keys.into_iter().collect());
        self
    }

    fn origin_selected(&self, (pid, tid): ThreadKey) -> bool {
        if let Some(processes) = &self.processes {
            if !processes.contains(&pid) {
                return false;
            }
        }
        match &self.threads {
            Some(threads) => threads.contains(&(pid, tid)),
            None => true,
        }
    }
}

impl EntryPredicate for LogFilter {
    fn matches(&self, entries: &[LogEntry], entry: &LogEntry) -> bool {
        match entry {
            LogEntry::Text(_) => return self.show_text,
            LogEntry::Call(_) if !self.show_relay => return false,
            LogEntry::Return(ret) => {
                if !self.show_relay {
                    return false;
                }
                let inlined = ret
                    .parent
                    .and_then(|parent| entries.get(parent.get()))
                    .and_then(LogEntry::as_call)
                    .is_some_and(|call| call.inlinable);
                if self.hide_inlined_returns && inlined {
                    return false;
                }
            }
            LogEntry::Message(msg) if self.hidden_classes.contains(&msg.class) => return false,
            LogEntry::Call(_) | LogEntry::Message(_) => {}
        }

        entry
            .origin()
            .is_none_or(|origin| self.origin_selected(origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ThreadId;
    use crate::parser::parse_str;

    const LOG: &str = "\
00c8:00cc:Call KERNEL32.Sleep(00000000) ret=10
00c8:00cc:Ret  KERNEL32.Sleep() retval=0 ret=10
00c8:00cc:fixme:thread:a first
00c8:00ff:err:thread:b second
00aa:00ab:warn:thread:c third
free text";

    fn visible(filter: &dyn EntryPredicate) -> Vec<usize> {
        let result = parse_str(LOG).unwrap();
        result
            .entries
            .iter()
            .filter(|entry| filter.matches(&result.entries, entry))
            .map(|entry| entry.id().get())
            .collect()
    }

    #[test]
    fn default_hides_only_inlined_returns() {
        assert_eq!(visible(&LogFilter::default()), vec![0, 2, 3, 4, 5]);
        assert_eq!(visible(&LogFilter::everything()), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn hides_text_and_relay() {
        let filter = LogFilter {
            show_text: false,
            show_relay: false,
            ..LogFilter::default()
        };
        assert_eq!(visible(&filter), vec![2, 3, 4]);
    }

    #[test]
    fn toggles_message_classes() {
        let mut filter = LogFilter::everything();
        filter.toggle_class(MessageClass::Fixme);
        filter.toggle_class(MessageClass::Warn);
        assert_eq!(visible(&filter), vec![0, 1, 3, 5]);

        filter.toggle_class(MessageClass::Fixme);
        assert_eq!(visible(&filter), vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn restricts_processes_and_threads_but_keeps_text() {
        let by_process = LogFilter::everything().with_processes([ProcessId::from(0xaa)]);
        assert_eq!(visible(&by_process), vec![4, 5]);

        let by_thread = LogFilter::everything()
            .with_threads([(ProcessId::from(0xc8), ThreadId::from(0xff))]);
        assert_eq!(visible(&by_thread), vec![3, 5]);
    }

    #[test]
    fn closures_are_predicates() {
        let only_messages = |entry: &LogEntry| matches!(entry, LogEntry::Message(_));
        assert_eq!(visible(&only_messages), vec![2, 3, 4]);
    }
}
