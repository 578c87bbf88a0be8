//! Log entry types produced by the parser.
//!
//! `LogEntry` is a sum type over the four kinds of output line. Back-references
//! (`parent`, `return`) are [`EntryId`]s into the same entry sequence rather than
//! pointers, so a parse result is a plain owned value.

use crate::model::{EntryId, ProcessId, ThreadId, ThreadKey};
use serde::Serialize;
use std::fmt;

// ===== MessageClass =====

/// Wine debug class of a message line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageClass {
    /// `fixme:` - unimplemented functionality.
    Fixme,
    /// `err:` - error.
    Err,
    /// `warn:` - warning.
    Warn,
    /// `trace:` - trace output; also the fallback for unknown classes.
    #[default]
    Trace,
}

impl MessageClass {
    /// Recognise a class token. Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "fixme" => Some(Self::Fixme),
            "err" => Some(Self::Err),
            "warn" => Some(Self::Warn),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// The token as printed by the tracer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixme => "fixme",
            Self::Err => "err",
            Self::Warn => "warn",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Entry payloads =====

/// Entry into an intercepted function (`Call` line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEntry {
    /// Sequence id.
    pub id: EntryId,
    /// Milliseconds since the first timestamped entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Emitting process.
    pub process: ProcessId,
    /// Emitting thread.
    pub thread: ThreadId,
    /// Innermost call open on this thread when the call was made.
    pub parent: Option<EntryId>,
    /// Module name (`KERNEL32`).
    pub module: String,
    /// Function name (`CreateToolhelp32Snapshot`).
    pub func: String,
    /// Raw argument strings, split on commas.
    pub args: Option<Vec<String>>,
    /// Return address used to pair this call with its return.
    pub callsite: Option<String>,
    /// The matching return, once seen.
    #[serde(rename = "return")]
    pub return_id: Option<EntryId>,
    /// The return immediately followed the call on this thread.
    pub inlinable: bool,
    /// Viewer state: the call's subtree is shown.
    pub is_expanded: bool,
}

/// Exit from an intercepted function (`Ret` line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnEntry {
    /// Sequence id.
    pub id: EntryId,
    /// Milliseconds since the first timestamped entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Emitting process.
    pub process: ProcessId,
    /// Emitting thread.
    pub thread: ThreadId,
    /// The call this return closes (or the open call when nothing matched).
    pub parent: Option<EntryId>,
    /// Module name.
    pub module: String,
    /// Function name.
    pub func: String,
    /// Return address, compared against the open call's.
    pub callsite: Option<String>,
    /// Returned value as printed (hex).
    pub retval: Option<String>,
}

/// Classified debug message (`class:channel:logger message`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageEntry {
    /// Sequence id.
    pub id: EntryId,
    /// Milliseconds since the first timestamped entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Emitting process.
    pub process: ProcessId,
    /// Emitting thread.
    pub thread: ThreadId,
    /// Innermost call open on this thread.
    pub parent: Option<EntryId>,
    /// Debug class.
    pub class: MessageClass,
    /// Debug channel (`module`, `threadname`, ...), possibly empty.
    pub channel: String,
    /// Emitting function, possibly empty.
    pub logger: String,
    /// Free-form message text.
    pub message: String,
}

/// A line that does not follow the line grammar at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEntry {
    /// Sequence id.
    pub id: EntryId,
    /// The line, verbatim.
    pub text: String,
}

// ===== EntryKind =====

/// Discriminant of a [`LogEntry`], used by filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// [`LogEntry::Call`]
    Call,
    /// [`LogEntry::Return`]
    Return,
    /// [`LogEntry::Message`]
    Message,
    /// [`LogEntry::Text`]
    Text,
}

// ===== LogEntry =====

/// One parsed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum LogEntry {
    /// Function entry.
    Call(CallEntry),
    /// Function exit.
    #[serde(rename = "Ret")]
    Return(ReturnEntry),
    /// Classified debug message.
    Message(MessageEntry),
    /// Unparseable line.
    Text(TextEntry),
}

impl LogEntry {
    /// Sequence id of the entry.
    pub fn id(&self) -> EntryId {
        match self {
            LogEntry::Call(call) => call.id,
            LogEntry::Return(ret) => ret.id,
            LogEntry::Message(msg) => msg.id,
            LogEntry::Text(text) => text.id,
        }
    }

    /// Kind of the entry.
    pub fn kind(&self) -> EntryKind {
        match self {
            LogEntry::Call(_) => EntryKind::Call,
            LogEntry::Return(_) => EntryKind::Return,
            LogEntry::Message(_) => EntryKind::Message,
            LogEntry::Text(_) => EntryKind::Text,
        }
    }

    /// Relative timestamp in milliseconds, when the log carries timestamps.
    pub fn time(&self) -> Option<i64> {
        match self {
            LogEntry::Call(call) => call.time,
            LogEntry::Return(ret) => ret.time,
            LogEntry::Message(msg) => msg.time,
            LogEntry::Text(_) => None,
        }
    }

    /// Enclosing call, if any. Text entries never have one.
    pub fn parent(&self) -> Option<EntryId> {
        match self {
            LogEntry::Call(call) => call.parent,
            LogEntry::Return(ret) => ret.parent,
            LogEntry::Message(msg) => msg.parent,
            LogEntry::Text(_) => None,
        }
    }

    /// Emitting process and thread. Text entries have no attribution.
    pub fn origin(&self) -> Option<ThreadKey> {
        match self {
            LogEntry::Call(call) => Some((call.process, call.thread)),
            LogEntry::Return(ret) => Some((ret.process, ret.thread)),
            LogEntry::Message(msg) => Some((msg.process, msg.thread)),
            LogEntry::Text(_) => None,
        }
    }

    /// The call payload, if this is a call.
    pub fn as_call(&self) -> Option<&CallEntry> {
        match self {
            LogEntry::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Mutable call payload, if this is a call.
    pub fn as_call_mut(&mut self) -> Option<&mut CallEntry> {
        match self {
            LogEntry::Call(call) => Some(call),
            _ => None,
        }
    }

    /// The return payload, if this is a return.
    pub fn as_return(&self) -> Option<&ReturnEntry> {
        match self {
            LogEntry::Return(ret) => Some(ret),
            _ => None,
        }
    }

    /// Returns true for `Ret` entries.
    pub fn is_return(&self) -> bool {
        matches!(self, LogEntry::Return(_))
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    fn make_call() -> CallEntry {
        CallEntry {
            id: EntryId::new(3),
            time: Some(450),
            process: ProcessId::from(0xc8),
            thread: ThreadId::from(0xcc),
            parent: Some(EntryId::new(1)),
            module: "KERNEL32".to_string(),
            func: "CreateToolhelp32Snapshot".to_string(),
            args: Some(vec!["00000002".to_string(), "00000000".to_string()]),
            callsite: Some("140001656".to_string()),
            return_id: None,
            inlinable: false,
            is_expanded: false,
        }
    }

    #[test]
    fn message_class_parses_known_tokens() {
        assert_eq!(MessageClass::parse("fixme"), Some(MessageClass::Fixme));
        assert_eq!(MessageClass::parse("err"), Some(MessageClass::Err));
        assert_eq!(MessageClass::parse("warn"), Some(MessageClass::Warn));
        assert_eq!(MessageClass::parse("trace"), Some(MessageClass::Trace));
    }

    #[test]
    fn message_class_rejects_unknown_tokens() {
        assert_eq!(MessageClass::parse("Starting"), None);
        assert_eq!(MessageClass::parse("TRACE"), None);
        assert_eq!(MessageClass::default(), MessageClass::Trace);
    }

    #[test]
    fn accessors_dispatch_over_variants() {
        let entry = LogEntry::Call(make_call());
        assert_eq!(entry.id(), EntryId::new(3));
        assert_eq!(entry.kind(), EntryKind::Call);
        assert_eq!(entry.time(), Some(450));
        assert_eq!(entry.parent(), Some(EntryId::new(1)));
        assert_eq!(
            entry.origin(),
            Some((ProcessId::from(0xc8), ThreadId::from(0xcc)))
        );
        assert!(entry.as_call().is_some());
        assert!(!entry.is_return());
    }

    #[test]
    fn text_entries_have_no_attribution() {
        let entry = LogEntry::Text(TextEntry {
            id: EntryId::new(0),
            text: "wineserver: using server-side synchronization.".to_string(),
        });
        assert_eq!(entry.parent(), None);
        assert_eq!(entry.origin(), None);
        assert_eq!(entry.time(), None);
    }

    #[test]
    fn serializes_with_type_tag_and_id_references() {
        let mut call = make_call();
        call.return_id = Some(EntryId::new(4));
        let json = serde_json::to_value(LogEntry::Call(call)).expect("serialize");

        assert_eq!(json["type"], "Call");
        assert_eq!(json["process"], "00c8");
        assert_eq!(json["parent"], 1);
        assert_eq!(json["return"], 4);
        assert_eq!(json["isExpanded"], false);
    }

    #[test]
    fn return_serializes_as_ret() {
        let entry = LogEntry::Return(ReturnEntry {
            id: EntryId::new(4),
            time: None,
            process: ProcessId::from(0xc8),
            thread: ThreadId::from(0xcc),
            parent: Some(EntryId::new(3)),
            module: "KERNEL32".to_string(),
            func: "CreateToolhelp32Snapshot".to_string(),
            callsite: Some("140001656".to_string()),
            retval: Some("00000050".to_string()),
        });
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["type"], "Ret");
        assert!(json.get("time").is_none());
    }
}
