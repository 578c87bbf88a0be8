//! Wine debug log explorer (winelog)
//!
//! Streaming parser and call-tree model for the output of `WINEDEBUG=+relay`
//! and friends. A log is decoded line by line, spliced lines from concurrent
//! threads are reassembled, each line is classified as a call, a return, a
//! debug message or free text, and calls are nested per thread into a tree
//! that can be collapsed, expanded and searched.
//!
//! ```
//! use winelog::parser::parse_str;
//! use winelog::state::{compact_tree, LogFilter};
//!
//! let log = "\
//! 00c8:00cc:Call KERNEL32.GetTickCount() ret=7b00f00d
//! 00c8:00cc:trace:time:GetTickCount called
//! 00c8:00cc:Ret  KERNEL32.GetTickCount() retval=0000beef ret=7b00f00d";
//! let result = parse_str(log).unwrap();
//!
//! // Calls start collapsed, so only the call itself is visible.
//! let view = compact_tree(&result.entries, Some(&LogFilter::default()));
//! assert_eq!(view.len(), 1);
//! ```
//!
//! The library is the pure core: [`parser`] builds a [`model::LogParseResult`]
//! and [`state`] navigates it. [`source`], [`config`], [`logging`] and
//! [`view`] are the shell used by the `winelog` binary.

pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;
pub mod state;
pub mod view;
