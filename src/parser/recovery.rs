//! Reassembly of lines spliced together by unsynchronised writers.
//!
//! Wine threads write to the same sink without locking, so one thread's line
//! can be cut in half by another's:
//!
//! ```text
//! 00c8:00cc:fix00c8:00cc:Call ntdll.RtlRunOnceExecuteOnce(...) ret=6fffffc88542
//! me:thread:get_thread_times not implemented on this platform
//! ```
//!
//! A line carrying a second header is split in two and the reassembler starts
//! caching. Well-formed lines keep being cached until a line without any header
//! arrives; that line is the tail of the first truncated fragment and is glued
//! back onto it. The cache is then replayed in order.

use crate::parser::grammar::{embedded_header_at, match_header};
use std::collections::VecDeque;
use tracing::debug;

/// Reassembly state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Lines pass straight through.
    #[default]
    Normal,
    /// A spliced line was seen; waiting for the continuation of its head.
    Recovery,
    /// Continuation found; cached lines are being replayed.
    Backfill,
}

/// Push-based reassembler.
///
/// Feed physical lines with [`Reassembler::push`]; logical lines come out in
/// order through the `out` queue. Call [`Reassembler::finish`] at end of input
/// so nothing cached is lost.
#[derive(Debug, Default)]
pub struct Reassembler {
    mode: RecoveryMode,
    cache: VecDeque<String>,
}

impl Reassembler {
    /// Reassembler in [`RecoveryMode::Normal`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn mode(&self) -> RecoveryMode {
        self.mode
    }

    /// Number of cached fragments.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Consume one physical line.
    pub fn push(&mut self, line: String, out: &mut VecDeque<String>) {
        if let Some(at) = embedded_header_at(&line) {
            self.split_into_cache(line, at, false);
            return;
        }

        match self.mode {
            RecoveryMode::Normal | RecoveryMode::Backfill => out.push_back(line),
            RecoveryMode::Recovery if match_header(&line).is_some() => {
                self.cache.push_back(line);
            }
            RecoveryMode::Recovery => {
                if let Some(head) = self.cache.front_mut() {
                    head.push_str(&line);
                }
                debug!(cached = self.cache.len(), "continuation found, backfilling");
                self.mode = RecoveryMode::Backfill;
                self.drain(out);
            }
        }
    }

    /// Flush every cached fragment at end of input.
    pub fn finish(&mut self, out: &mut VecDeque<String>) {
        if self.cache.is_empty() {
            self.mode = RecoveryMode::Normal;
            return;
        }
        debug!(
            cached = self.cache.len(),
            "end of input while recovering, flushing cache"
        );
        while !self.cache.is_empty() {
            self.mode = RecoveryMode::Backfill;
            self.drain(out);
        }
        self.mode = RecoveryMode::Normal;
    }

    fn split_into_cache(&mut self, mut line: String, at: usize, front: bool) {
        let tail = line.split_off(at);
        debug!(head = %line, tail = %tail, "spliced line, entering recovery");
        if front {
            self.cache.push_front(tail);
            self.cache.push_front(line);
        } else {
            self.cache.push_back(line);
            self.cache.push_back(tail);
        }
        self.mode = RecoveryMode::Recovery;
    }

    fn drain(&mut self, out: &mut VecDeque<String>) {
        while let Some(line) = self.cache.pop_front() {
            if let Some(at) = embedded_header_at(&line) {
                // Keep the new head fragment first in line for the next continuation.
                self.split_into_cache(line, at, true);
                return;
            }
            out.push_back(line);
        }
        debug!("backfill complete");
        self.mode = RecoveryMode::Normal;
    }
}
