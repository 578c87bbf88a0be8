//! Process/thread registry.
//!
//! Lookup-or-insert keyed by pid then tid. Processes and threads keep their
//! discovery order; nothing is ever merged, removed or renumbered.

use crate::model::{LogProcess, LogThread, ProcessId, ThreadKey};
use std::collections::HashMap;
use tracing::debug;

/// Processes and threads observed so far in one parse.
#[derive(Debug, Default)]
pub struct Registry {
    processes: Vec<LogProcess>,
    process_index: HashMap<ProcessId, usize>,
    thread_index: HashMap<ThreadKey, usize>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `(pid, tid)` exists, creating the process and/or thread on
    /// first sight.
    pub fn observe(&mut self, key: ThreadKey) {
        let (pid, tid) = key;
        let process_slot = match self.process_index.get(&pid) {
            Some(&slot) => slot,
            None => {
                debug!(pid = %pid, "new process");
                self.processes.push(LogProcess::new(pid));
                let slot = self.processes.len() - 1;
                self.process_index.insert(pid, slot);
                slot
            }
        };

        if !self.thread_index.contains_key(&key) {
            let threads = &mut self.processes[process_slot].threads;
            threads.push(LogThread::new(tid));
            self.thread_index.insert(key, threads.len() - 1);
        }
    }

    /// Overwrite the name of a known thread. Unknown threads are ignored.
    pub fn rename_thread(&mut self, key: ThreadKey, name: &str) {
        if let Some(thread) = self.thread_mut(key) {
            thread.name = Some(name.to_string());
        }
    }

    /// Record the image path of a process, at most once.
    ///
    /// Doubled backslashes are collapsed and the name is derived from the last
    /// path component. Returns `false` if the path was already set or the
    /// process is unknown.
    pub fn set_process_path(&mut self, pid: ProcessId, raw_path: &str) -> bool {
        let Some(process) = self.process_mut(pid) else {
            return false;
        };
        if process.path.is_some() {
            return false;
        }
        let path = raw_path.replace(r"\\", r"\");
        process.name = Some(super::grammar::basename(&path).to_string());
        process.path = Some(path);
        true
    }

    /// Process by id.
    pub fn process(&self, pid: ProcessId) -> Option<&LogProcess> {
        self.process_index
            .get(&pid)
            .map(|&slot| &self.processes[slot])
    }

    /// Thread by `(pid, tid)`.
    pub fn thread(&self, key: ThreadKey) -> Option<&LogThread> {
        let process = self.process(key.0)?;
        self.thread_index
            .get(&key)
            .and_then(|&slot| process.threads.get(slot))
    }

    /// Number of processes seen.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Returns true if no process has been seen.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Hand over the processes in discovery order.
    pub fn into_processes(self) -> Vec<LogProcess> {
        self.processes
    }

    fn process_mut(&mut self, pid: ProcessId) -> Option<&mut LogProcess> {
        let slot = *self.process_index.get(&pid)?;
        self.processes.get_mut(slot)
    }

    fn thread_mut(&mut self, key: ThreadKey) -> Option<&mut LogThread> {
        let slot = *self.thread_index.get(&key)?;
        self.process_mut(key.0)?.threads.get_mut(slot)
    }
}
