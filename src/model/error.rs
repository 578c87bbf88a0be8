//! Error types for winelog.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via
//! `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level binary error wrapping every failure below
//!   - [`InputError`] - Opening or reading the byte source
//!   - [`ParseError`] - Structural violations of the line grammar (fatal)
//!   - [`ConfigError`](crate::config::ConfigError) - Config file problems
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing setup problems
//!
//! # What is *not* an error
//!
//! Unparseable lines become `Text` entries, unknown debug classes fall back to
//! `trace`, and relay lines whose callee is not `module.func` are skipped. Only
//! the two cases in [`ParseError`] abort a parse.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all failure modes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to open or read input.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// The log violated the line grammar beyond what recovery handles.
    #[error("Failed to parse log: {0}")]
    Parse(#[from] ParseError),

    /// The configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracing could not be initialised.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors encountered when reading log input.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified log file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use winelog::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.log")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.log"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// No file path was given and stdin is an interactive terminal.
    #[error("No input source: provide a file path or pipe data to stdin")]
    NoInput,

    /// Generic I/O error reading from the source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal structural errors raised while classifying lines.
///
/// `line` is the 1-based physical line number last consumed from the input when
/// the error surfaced; `raw` is the offending (possibly reassembled) line.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A `Call`/`Ret` header matched but its body is not `callee(args)...`.
    #[error("Could not parse Call/Ret line at line {line}: '{raw}'")]
    MalformedRelay {
        /// Physical line number.
        line: usize,
        /// Offending logical line.
        raw: String,
    },

    /// A module load-order message lacks its `L"..."` path.
    #[error("Could not extract wide string at line {line}: '{raw}'")]
    MissingWideString {
        /// Physical line number.
        line: usize,
        /// Offending logical line.
        raw: String,
    },

    /// Reading the input failed mid-stream.
    #[error(transparent)]
    Input(#[from] InputError),
}

impl ParseError {
    /// The offending raw line, for structural errors.
    pub fn raw_line(&self) -> Option<&str> {
        match self {
            ParseError::MalformedRelay { raw, .. } | ParseError::MissingWideString { raw, .. } => {
                Some(raw)
            }
            ParseError::Input(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn input_error_no_input_display() {
        let msg = InputError::NoInput.to_string();
        assert!(msg.contains("No input source"));
        assert!(msg.contains("file path or pipe data to stdin"));
    }

    #[test]
    fn input_error_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let input_err: InputError = io_err.into();
        let msg = input_err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn malformed_relay_reports_line_and_raw() {
        let err = ParseError::MalformedRelay {
            line: 12,
            raw: "00c8:00cc:Call garbage".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 12"));
        assert!(msg.contains("'00c8:00cc:Call garbage'"));
        assert_eq!(err.raw_line(), Some("00c8:00cc:Call garbage"));
    }

    #[test]
    fn missing_wide_string_display() {
        let err = ParseError::MissingWideString {
            line: 3,
            raw: "00aa:00aa:trace:module:get_load_order looking for".to_string(),
        };
        assert!(err.to_string().contains("wide string"));
    }

    #[test]
    fn parse_error_input_is_transparent() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "stream cut");
        let err: ParseError = InputError::from(io_err).into();
        assert!(err.to_string().contains("stream cut"));
        assert_eq!(err.raw_line(), None);
    }

    #[test]
    fn app_error_from_parse_error() {
        let err: AppError = ParseError::MalformedRelay {
            line: 1,
            raw: "x".to_string(),
        }
        .into();
        assert!(err.to_string().contains("Failed to parse log"));
    }

    #[test]
    fn app_error_nested_io_through_input_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = InputError::from(io_err).into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to read input"));
        assert!(msg.contains("file not found"));
    }
}
