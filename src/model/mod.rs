//! Domain model types (pure).
//!
//! All types in this module are plain data; the parser is the only producer.

pub mod error;
pub mod identifiers;
pub mod log_entry;
pub mod parse_result;
pub mod process;

// Re-export for convenience
pub use error::{AppError, InputError, ParseError};
pub use identifiers::{EntryId, InvalidProcessId, InvalidThreadId, ProcessId, ThreadId, ThreadKey};
pub use log_entry::{
    CallEntry, EntryKind, LogEntry, MessageClass, MessageEntry, ReturnEntry, TextEntry,
};
pub use parse_result::LogParseResult;
pub use process::{LogProcess, LogThread};
