//! Processes and threads discovered while parsing.

use crate::model::{ProcessId, ThreadId};
use serde::Serialize;

/// A thread seen in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogThread {
    /// Tracer-assigned thread id.
    pub id: ThreadId,
    /// Name from the most recent thread-rename message, if any.
    pub name: Option<String>,
}

impl LogThread {
    /// A freshly discovered, unnamed thread.
    pub fn new(id: ThreadId) -> Self {
        Self { id, name: None }
    }
}

/// A process seen in the log.
///
/// `name` and `path` are filled in at most once, from the first module
/// load-order message of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogProcess {
    /// Tracer-assigned process id.
    pub id: ProcessId,
    /// Executable file name (last component of `path`).
    pub name: Option<String>,
    /// Windows path of the executable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Threads in discovery order.
    pub threads: Vec<LogThread>,
}

impl LogProcess {
    /// A freshly discovered process with no threads yet.
    pub fn new(id: ProcessId) -> Self {
        Self {
            id,
            name: None,
            path: None,
            threads: Vec::new(),
        }
    }

    /// Look up one of this process' threads.
    pub fn thread(&self, id: ThreadId) -> Option<&LogThread> {
        self.threads.iter().find(|thread| thread.id == id)
    }
}
