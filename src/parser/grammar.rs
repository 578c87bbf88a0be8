//! Line grammar of Wine debug output.
//!
//! ```text
//! line       := [timestamp ":"] pid ":" tid ":" type SP+ message
//! timestamp  := digits "." digits
//! type       := "Call" | "Ret" | class ":" channel ":" logger
//! callmsg    := (module "." func | freeform) "(" [args] ")" [" retval=" hex] [" ret=" hex]
//! widestring := "L\"" chars "\""
//! ```
//!
//! Every matcher here is pure and allocation free; the classifier in
//! [`super::LogParser`] decides what to do with the pieces.

use crate::model::{MessageClass, ProcessId, ThreadId};
use regex::Regex;
use std::sync::LazyLock;

/// Type token of a function entry line.
pub const TYPE_CALL: &str = "Call";
/// Type token of a function exit line.
pub const TYPE_RETURN: &str = "Ret";
/// Channel whose messages carry a thread name.
pub const CHANNEL_THREADNAME: &str = "threadname";
/// Channel of the module loader.
pub const CHANNEL_MODULE: &str = "module";
/// Loader function whose messages carry the process image path.
pub const LOGGER_GET_LOAD_ORDER: &str = "get_load_order";

// Channel names may contain digits (`d3d`, `wined3d`), so the type token does too.
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?P<timestamp>[0-9]+\.[0-9]+):)?(?P<pid>[a-f0-9]{4}):(?P<tid>[a-f0-9]{4}):(?P<type>[a-zA-Z0-9_:]+)(?: +(?P<message>.*)|$)",
    )
    .expect("header pattern is valid")
});

static LEADING_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+:").expect("timestamp pattern is valid"));

static RELAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?P<module>\w+)\.(?P<func>\w+)|(?P<unknown>.+))\((?P<args>.+)?\)(?: retval=(?P<retval>[a-f0-9]+))?(?: ret=(?P<callsite>[a-f0-9]+))?",
    )
    .expect("relay pattern is valid")
});

static WIDE_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"L"(?P<string>.+)""#).expect("wide string pattern is valid"));

/// The header fields of a line that follows the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    /// Raw `seconds.fraction` prefix, if the log is timestamped.
    pub timestamp: Option<&'a str>,
    /// Emitting process.
    pub pid: ProcessId,
    /// Emitting thread.
    pub tid: ThreadId,
    /// `Call`, `Ret` or `class:channel:logger`.
    pub kind: &'a str,
    /// Everything after the type token; empty when the line ends at the type.
    pub message: &'a str,
}

/// Match the header grammar anywhere in `line` (leftmost match wins).
pub fn match_header(line: &str) -> Option<Header<'_>> {
    let caps = HEADER.captures(line)?;
    let pid = ProcessId::parse(caps.name("pid")?.as_str()).ok()?;
    let tid = ThreadId::parse(caps.name("tid")?.as_str()).ok()?;
    Some(Header {
        timestamp: caps.name("timestamp").map(|m| m.as_str()),
        pid,
        tid,
        kind: caps.name("type")?.as_str(),
        message: caps.name("message").map_or("", |m| m.as_str()),
    })
}

/// Byte position of a second header spliced into `line`, if any.
///
/// The scan starts one character past the line's own header start, or past
/// the whole timestamp prefix when there is one, so the line's legitimate
/// header (and the digits of its timestamp) never count.
///
/// A writer cut off right after digits (`retval=0000`) leaves them glued to
/// the next writer's timestamp. Timestamps within one log have the same
/// number of seconds digits, so surplus leading digits stay with the head.
pub fn embedded_header_at(line: &str) -> Option<usize> {
    let own = LEADING_TIMESTAMP.find(line);
    let skip = own.map_or(0, |m| m.end());
    let offset = skip + line[skip..].chars().next()?.len_utf8();
    let caps = HEADER.captures(&line[offset..])?;
    let start = offset + caps.get(0)?.start();

    let surplus = match (own, caps.name("timestamp")) {
        (Some(own), Some(stamp)) => {
            seconds_digits(stamp.as_str()).saturating_sub(seconds_digits(own.as_str()))
        }
        _ => 0,
    };
    Some(start + surplus)
}

fn seconds_digits(timestamp: &str) -> usize {
    timestamp.find('.').unwrap_or(0)
}

/// Convert a `seconds.fraction` timestamp to whole milliseconds.
///
/// The fraction is truncated (or right padded) to three digits. Returns `None`
/// if the value does not fit an `i64`.
pub fn timestamp_millis(raw: &str) -> Option<i64> {
    let (secs, fraction) = raw.split_once('.')?;
    let secs: i64 = secs.parse().ok()?;
    let mut millis = 0i64;
    let mut digits = fraction.bytes().take(3);
    for position in 0..3 {
        let digit = match digits.next() {
            Some(b) if b.is_ascii_digit() => i64::from(b - b'0'),
            Some(_) => return None,
            None => 0,
        };
        millis += digit * 10i64.pow(2 - position);
    }
    secs.checked_mul(1000)?.checked_add(millis)
}

/// Decoded body of a `Call`/`Ret` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayBody<'a> {
    /// DLL name.
    pub module: &'a str,
    /// Exported function name.
    pub func: &'a str,
    /// Raw argument list between the outermost parentheses.
    pub args: Option<&'a str>,
    /// Returned value (`Ret` lines only).
    pub retval: Option<&'a str>,
    /// Return address.
    pub callsite: Option<&'a str>,
}

impl RelayBody<'_> {
    /// Arguments split on commas, raw and unparsed.
    pub fn split_args(&self) -> Option<Vec<String>> {
        self.args
            .map(|args| args.split(',').map(str::to_string).collect())
    }
}

/// Outcome of applying the call grammar to a relay message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMatch<'a> {
    /// `module.func(args)` form.
    Decoded(RelayBody<'a>),
    /// Callee did not split into `module.func` (`PE DLL (...)`, thunks).
    Undecodable,
    /// The body does not follow the call grammar at all.
    Malformed,
}

/// Apply the call grammar to the message part of a `Call`/`Ret` line.
pub fn match_relay(message: &str) -> RelayMatch<'_> {
    let Some(caps) = RELAY.captures(message) else {
        return RelayMatch::Malformed;
    };
    if caps.name("unknown").is_some() {
        return RelayMatch::Undecodable;
    }
    match (caps.name("module"), caps.name("func")) {
        (Some(module), Some(func)) => RelayMatch::Decoded(RelayBody {
            module: module.as_str(),
            func: func.as_str(),
            args: caps.name("args").map(|m| m.as_str()),
            retval: caps.name("retval").map(|m| m.as_str()),
            callsite: caps.name("callsite").map(|m| m.as_str()),
        }),
        _ => RelayMatch::Malformed,
    }
}

/// Contents of the (greedy) `L"..."` wide string in `message`.
pub fn wide_string(message: &str) -> Option<&str> {
    WIDE_STRING
        .captures(message)
        .and_then(|caps| caps.name("string"))
        .map(|m| m.as_str())
}

/// A `class:channel:logger` type token split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageType<'a> {
    /// Recognised debug class.
    pub class: MessageClass,
    /// Channel, empty when absent.
    pub channel: &'a str,
    /// Logger, empty when absent.
    pub logger: &'a str,
}

/// Split a type token. Returns `None` when the class is not a debug class
/// (`Starting thread proc ...` style lines).
pub fn split_message_type(kind: &str) -> Option<MessageType<'_>> {
    let mut parts = kind.split(':');
    let class = MessageClass::parse(parts.next()?)?;
    Some(MessageType {
        class,
        channel: parts.next().unwrap_or(""),
        logger: parts.next().unwrap_or(""),
    })
}

/// Final `\`-separated component of a Windows path.
pub fn basename(path: &str) -> &str {
    path.rsplit('\\').next().unwrap_or(path)
}
