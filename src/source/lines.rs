//! Chunked byte-to-line decoding.
//!
//! Lines are split on raw bytes before UTF-8 decoding. A `\n` byte can never
//! be part of a multi-byte sequence, so code points straddling a chunk boundary
//! always end up decoded whole.

use crate::model::error::InputError;
use std::io::{ErrorKind, Read};
use tracing::trace;

/// Default number of bytes requested per read.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Callback receiving the cumulative number of bytes read so far.
pub type ProgressCallback<'a> = Box<dyn FnMut(u64) + 'a>;

/// Lazy sequence of text lines over a byte source.
///
/// Recognises `\n` and `\r\n`. A final line without terminator is still
/// produced. Invalid UTF-8 is replaced with U+FFFD. The sequence is consumed
/// once; there is no rewinding.
pub struct LineDecoder<'a, R> {
    reader: R,
    chunk: Vec<u8>,
    pending: Vec<u8>,
    start: usize,
    scanned: usize,
    bytes_read: u64,
    lines_emitted: usize,
    on_progress: Option<ProgressCallback<'a>>,
    eof: bool,
}

impl<'a, R: Read> LineDecoder<'a, R> {
    /// Decoder reading `DEFAULT_CHUNK_SIZE` bytes at a time.
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    /// Decoder with an explicit read size (clamped to at least one byte).
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk: vec![0; chunk_size.max(1)],
            pending: Vec::new(),
            start: 0,
            scanned: 0,
            bytes_read: 0,
            lines_emitted: 0,
            on_progress: None,
            eof: false,
        }
    }

    /// Invoke `callback` after every read that yields bytes.
    pub fn on_progress(mut self, callback: impl FnMut(u64) + 'a) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Install an already boxed progress callback.
    pub fn with_progress(mut self, callback: Option<ProgressCallback<'a>>) -> Self {
        self.on_progress = callback;
        self
    }

    /// Total bytes consumed from the reader.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of lines produced so far.
    pub fn lines_emitted(&self) -> usize {
        self.lines_emitted
    }

    fn emit(&mut self, end: usize, next_start: usize) -> String {
        let mut bytes = &self.pending[self.start..end];
        if self.lines_emitted == 0 {
            bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        }
        let line = String::from_utf8_lossy(bytes).into_owned();
        self.start = next_start;
        self.scanned = next_start;
        self.lines_emitted += 1;
        line
    }

    fn fill(&mut self) -> Result<(), InputError> {
        // Drop already emitted bytes before growing the buffer.
        if self.start > 0 {
            self.pending.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }

        loop {
            match self.reader.read(&mut self.chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.pending.extend_from_slice(&self.chunk[..n]);
                    self.bytes_read += n as u64;
                    trace!(bytes_read = self.bytes_read, "read chunk");
                    if let Some(callback) = self.on_progress.as_mut() {
                        callback(self.bytes_read);
                    }
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl<R: Read> Iterator for LineDecoder<'_, R> {
    type Item = Result<String, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(offset) = self.pending[self.scanned..]
                .iter()
                .position(|&b| b == b'\n')
            {
                let newline = self.scanned + offset;
                let end = if newline > self.start && self.pending[newline - 1] == b'\r' {
                    newline - 1
                } else {
                    newline
                };
                return Some(Ok(self.emit(end, newline + 1)));
            }
            self.scanned = self.pending.len();

            if self.eof {
                if self.start < self.pending.len() {
                    let end = self.pending.len();
                    return Some(Ok(self.emit(end, end)));
                }
                return None;
            }

            if let Err(err) = self.fill() {
                self.eof = true;
                return Some(Err(err));
            }
        }
    }
}

impl<R> std::fmt::Debug for LineDecoder<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineDecoder")
            .field("bytes_read", &self.bytes_read)
            .field("lines_emitted", &self.lines_emitted)
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::{self, Cursor};

    /// Reader handing out fixed-size slices, to exercise chunk boundaries.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn collect(decoder: LineDecoder<'_, impl Read>) -> Vec<String> {
        decoder.map(|line| line.expect("line")).collect()
    }

    #[test]
    fn splits_on_lf_and_crlf() {
        let lines = collect(LineDecoder::new(Cursor::new("one\ntwo\r\nthree\n")));
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn emits_final_line_without_terminator() {
        let lines = collect(LineDecoder::new(Cursor::new("one\ntwo")));
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn keeps_empty_lines_but_no_trailing_empty_line() {
        let lines = collect(LineDecoder::new(Cursor::new("a\n\nb\n")));
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let lines = collect(LineDecoder::new(Cursor::new("")));
        assert!(lines.is_empty());
    }

    #[test]
    fn multibyte_sequences_survive_every_chunk_boundary() {
        let text = "trace:locale (a Ä€ 𐀀)\nnext æ–‡ 🦄\n";
        for step in 1..8 {
            let reader = Trickle {
                data: text.as_bytes().to_vec(),
                pos: 0,
                step,
            };
            let lines = collect(LineDecoder::with_chunk_size(reader, step));
            assert_eq!(
                lines,
                vec!["trace:locale (a Ä€ 𐀀)", "next æ–‡ 🦄"],
                "chunk size {step}"
            );
        }
    }

    #[test]
    fn crlf_split_across_chunks() {
        let reader = Trickle {
            data: b"ab\r\ncd".to_vec(),
            pos: 0,
            step: 3,
        };
        let lines = collect(LineDecoder::with_chunk_size(reader, 3));
        assert_eq!(lines, vec!["ab", "cd"]);
    }

    #[test]
    fn reports_monotonic_cumulative_progress() {
        let seen = RefCell::new(Vec::new());
        let reader = Trickle {
            data: b"0123456789\n".to_vec(),
            pos: 0,
            step: 4,
        };
        let decoder =
            LineDecoder::with_chunk_size(reader, 4).on_progress(|n| seen.borrow_mut().push(n));
        let lines = collect(decoder);

        assert_eq!(lines, vec!["0123456789"]);
        assert_eq!(*seen.borrow(), vec![4, 8, 11]);
    }

    #[test]
    fn strips_leading_byte_order_mark() {
        let lines = collect(LineDecoder::new(Cursor::new(b"\xEF\xBB\xBFfirst\nsecond".to_vec())));
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn replaces_invalid_utf8() {
        let lines = collect(LineDecoder::new(Cursor::new(b"bad \xFF byte\n".to_vec())));
        assert_eq!(lines, vec!["bad \u{FFFD} byte"]);
    }

    #[test]
    fn counts_emitted_lines() {
        let mut decoder = LineDecoder::new(Cursor::new("a\nb\nc"));
        decoder.next();
        decoder.next();
        assert_eq!(decoder.lines_emitted(), 2);
        assert_eq!(decoder.bytes_read(), 5);
    }
}
