//! Wine debug log parser.
//!
//! Physical lines go through the [`recovery::Reassembler`], each logical line
//! is classified against the [`grammar`], processes and threads are tracked by
//! the [`registry::Registry`] and calls are nested by the
//! [`call_tree::CallTreeBuilder`].
//!
//! The parse is single threaded and owns all of its state; the returned
//! [`LogParseResult`] is a plain value.

pub mod call_tree;
pub mod grammar;
pub mod recovery;
pub mod registry;

use crate::model::{
    CallEntry, EntryId, LogEntry, LogParseResult, MessageClass, MessageEntry, ParseError,
    ReturnEntry, TextEntry, ThreadKey,
};
use crate::source::{LineDecoder, ProgressCallback, DEFAULT_CHUNK_SIZE};
use call_tree::CallTreeBuilder;
use grammar::{
    Header, RelayMatch, CHANNEL_MODULE, CHANNEL_THREADNAME, LOGGER_GET_LOAD_ORDER, TYPE_CALL,
    TYPE_RETURN,
};
use recovery::Reassembler;
use registry::Registry;
use std::collections::VecDeque;
use std::fmt;
use std::io::Read;
use tracing::{debug, info};

/// Knobs for [`parse_log`].
pub struct ParseOptions<'a> {
    /// Bytes requested per read.
    pub chunk_size: usize,
    /// Called with the cumulative byte count after every read.
    pub on_read_progress: Option<ProgressCallback<'a>>,
}

impl<'a> ParseOptions<'a> {
    /// Override the read size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Install a progress callback.
    pub fn on_read_progress(mut self, callback: impl FnMut(u64) + 'a) -> Self {
        self.on_read_progress = Some(Box::new(callback));
        self
    }
}

impl Default for ParseOptions<'_> {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            on_read_progress: None,
        }
    }
}

impl fmt::Debug for ParseOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("chunk_size", &self.chunk_size)
            .field("on_read_progress", &self.on_read_progress.is_some())
            .finish()
    }
}

/// Parse a whole log from a byte source.
///
/// # Errors
///
/// Returns [`ParseError::MalformedRelay`] or [`ParseError::MissingWideString`]
/// when a line violates the grammar beyond what recovery handles, and
/// [`ParseError::Input`] when reading fails. No partial result is returned.
pub fn parse_log<R: Read>(
    reader: R,
    options: ParseOptions<'_>,
) -> Result<LogParseResult, ParseError> {
    let lines = LineDecoder::with_chunk_size(reader, options.chunk_size)
        .with_progress(options.on_read_progress);

    let mut parser = LogParser::new();
    for line in lines {
        parser.push_line(line?)?;
    }
    parser.finish()
}

/// Parse an in-memory log.
///
/// # Errors
///
/// Same structural errors as [`parse_log`].
pub fn parse_str(input: &str) -> Result<LogParseResult, ParseError> {
    parse_log(input.as_bytes(), ParseOptions::default())
}

/// Incremental parser fed one physical line at a time.
///
/// ```
/// use winelog::parser::LogParser;
///
/// let mut parser = LogParser::new();
/// parser.push_line("00c8:00cc:Call KERNEL32.Sleep(00000000) ret=7b00f00d").unwrap();
/// parser.push_line("00c8:00cc:Ret  KERNEL32.Sleep() retval=00000000 ret=7b00f00d").unwrap();
/// let result = parser.finish().unwrap();
///
/// assert_eq!(result.entries.len(), 2);
/// assert!(result.entries[0].as_call().unwrap().inlinable);
/// ```
#[derive(Debug, Default)]
pub struct LogParser {
    entries: Vec<LogEntry>,
    registry: Registry,
    tree: CallTreeBuilder,
    reassembler: Reassembler,
    ready: VecDeque<String>,
    time_base: Option<i64>,
    physical_lines: usize,
}

impl LogParser {
    /// Parser with empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next physical line (without its terminator).
    ///
    /// Entries may be emitted later than the line that produced them while a
    /// spliced line is being reassembled.
    ///
    /// # Errors
    ///
    /// Returns a structural [`ParseError`] for a relay line outside the call
    /// grammar or a load-order message without its path. The parser should be
    /// discarded afterwards.
    pub fn push_line(&mut self, line: impl Into<String>) -> Result<(), ParseError> {
        self.physical_lines += 1;
        self.reassembler.push(line.into(), &mut self.ready);
        self.classify_ready()
    }

    /// Flush any lines held back for reassembly and return the result.
    ///
    /// # Errors
    ///
    /// Same as [`LogParser::push_line`], for the flushed lines.
    pub fn finish(mut self) -> Result<LogParseResult, ParseError> {
        self.reassembler.finish(&mut self.ready);
        self.classify_ready()?;

        info!(
            lines = self.physical_lines,
            processes = self.registry.len(),
            entries = self.entries.len(),
            "parse complete"
        );
        Ok(LogParseResult {
            processes: self.registry.into_processes(),
            entries: self.entries,
        })
    }

    /// Entries emitted so far.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Physical lines consumed so far.
    pub fn lines_consumed(&self) -> usize {
        self.physical_lines
    }

    fn classify_ready(&mut self) -> Result<(), ParseError> {
        while let Some(line) = self.ready.pop_front() {
            self.classify(line)?;
        }
        Ok(())
    }

    fn classify(&mut self, line: String) -> Result<(), ParseError> {
        let id = EntryId::new(self.entries.len());
        // A relay line cut off at its type token has no body to decode.
        let header = grammar::match_header(&line).filter(|header| {
            !(header.message.is_empty() && matches!(header.kind, TYPE_CALL | TYPE_RETURN))
        });
        let Some(header) = header else {
            self.entries.push(LogEntry::Text(TextEntry { id, text: line }));
            return Ok(());
        };

        let time = header
            .timestamp
            .and_then(grammar::timestamp_millis)
            .map(|millis| millis - *self.time_base.get_or_insert(millis));
        let key = (header.pid, header.tid);
        self.registry.observe(key);

        let entry = match header.kind {
            TYPE_CALL | TYPE_RETURN => {
                let body = match grammar::match_relay(header.message) {
                    RelayMatch::Decoded(body) => body,
                    RelayMatch::Undecodable => {
                        debug!(line = self.physical_lines, "skipping undecodable relay site");
                        return Ok(());
                    }
                    RelayMatch::Malformed => {
                        return Err(ParseError::MalformedRelay {
                            line: self.physical_lines,
                            raw: line.clone(),
                        });
                    }
                };

                if header.kind == TYPE_CALL {
                    let parent = self.tree.open_call(key);
                    self.tree.enter(key, id);
                    LogEntry::Call(CallEntry {
                        id,
                        time,
                        process: header.pid,
                        thread: header.tid,
                        parent,
                        module: body.module.to_string(),
                        func: body.func.to_string(),
                        args: body.split_args(),
                        callsite: body.callsite.map(str::to_string),
                        return_id: None,
                        inlinable: false,
                        is_expanded: false,
                    })
                } else {
                    let parent = self.tree.leave(&mut self.entries, key, body.callsite, id);
                    LogEntry::Return(ReturnEntry {
                        id,
                        time,
                        process: header.pid,
                        thread: header.tid,
                        parent,
                        module: body.module.to_string(),
                        func: body.func.to_string(),
                        callsite: body.callsite.map(str::to_string),
                        retval: body.retval.map(str::to_string),
                    })
                }
            }
            _ => LogEntry::Message(self.message_entry(id, time, key, &header, &line)?),
        };

        self.tree.emitted(key, id);
        self.entries.push(entry);
        Ok(())
    }

    fn message_entry(
        &mut self,
        id: EntryId,
        time: Option<i64>,
        key: ThreadKey,
        header: &Header<'_>,
        raw: &str,
    ) -> Result<MessageEntry, ParseError> {
        let parent = self.tree.open_call(key);
        let Some(kind) = grammar::split_message_type(header.kind) else {
            // Not a debug class: keep the token as part of the text.
            let message = if header.message.is_empty() {
                header.kind.to_string()
            } else {
                format!("{} {}", header.kind, header.message)
            };
            return Ok(MessageEntry {
                id,
                time,
                process: header.pid,
                thread: header.tid,
                parent,
                class: MessageClass::default(),
                channel: String::new(),
                logger: String::new(),
                message,
            });
        };

        if kind.channel == CHANNEL_THREADNAME {
            if let Some(name) = grammar::wide_string(header.message) {
                self.registry.rename_thread(key, name);
            }
        } else if kind.channel == CHANNEL_MODULE && kind.logger == LOGGER_GET_LOAD_ORDER {
            let Some(path) = grammar::wide_string(header.message) else {
                return Err(ParseError::MissingWideString {
                    line: self.physical_lines,
                    raw: raw.to_string(),
                });
            };
            self.registry.set_process_path(header.pid, path);
        }

        Ok(MessageEntry {
            id,
            time,
            process: header.pid,
            thread: header.tid,
            parent,
            class: kind.class,
            channel: kind.channel.to_string(),
            logger: kind.logger.to_string(),
            message: header.message.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
