//! Log input sources.
//!
//! This module provides the byte sources a Wine log is read from:
//! - File input for a path given on the command line
//! - Stdin for piped input (`wine app.exe 2>&1 | winelog`)
//! - [`LineDecoder`] turning either into a lazy sequence of lines

use crate::model::error::InputError;
use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

pub mod lines;

pub use lines::{LineDecoder, ProgressCallback, DEFAULT_CHUNK_SIZE};

/// Unified input source for Wine debug output.
///
/// Sum type enforces exactly one variant. Both variants are plain byte
/// streams; decoding happens in [`LineDecoder`].
#[derive(Debug)]
pub enum InputSource {
    /// Opened log file.
    File {
        /// Path the file was opened from.
        path: PathBuf,
        /// Open handle.
        file: File,
    },
    /// Piped standard input.
    Stdin(io::Stdin),
}

impl InputSource {
    /// Total size in bytes, when known up front.
    ///
    /// Only files report a size; stdin is unbounded.
    pub fn len_hint(&self) -> Option<u64> {
        match self {
            InputSource::File { file, .. } => file.metadata().ok().map(|meta| meta.len()),
            InputSource::Stdin(_) => None,
        }
    }

    /// Human readable name for log output.
    pub fn describe(&self) -> String {
        match self {
            InputSource::File { path, .. } => path.display().to_string(),
            InputSource::Stdin(_) => "<stdin>".to_string(),
        }
    }
}

impl Read for InputSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputSource::File { file, .. } => file.read(buf),
            InputSource::Stdin(stdin) => stdin.read(buf),
        }
    }
}

/// Detect and open the appropriate input source.
///
/// # Logic:
/// 1. If a file path is provided: open it
/// 2. If stdin is piped: use stdin
/// 3. Else: return [`InputError::NoInput`]
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the file does not exist.
/// Returns `InputError::NoInput` if no file is provided and stdin is a terminal.
/// Returns `InputError::Io` if the file exists but cannot be opened.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => {
            if !path.exists() {
                return Err(InputError::FileNotFound { path });
            }
            let file = File::open(&path)?;
            Ok(InputSource::File { path, file })
        }
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(InputError::NoInput);
            }
            Ok(InputSource::Stdin(stdin))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn detect_returns_file_source_for_existing_file() {
        let test_file = std::env::temp_dir().join("winelog_detect_existing.log");
        fs::write(&test_file, "0024:0028:Call KERNEL32.Sleep(00000000) ret=7b00f00d\n").unwrap();

        let result = detect_input_source(Some(test_file.clone()));
        let _ = fs::remove_file(&test_file);

        let source = result.unwrap();
        assert!(
            matches!(source, InputSource::File { .. }),
            "Should be File variant, got: {:?}",
            source
        );
    }

    #[test]
    fn file_source_reads_bytes_and_reports_size() {
        let test_file = std::env::temp_dir().join("winelog_detect_read.log");
        fs::write(&test_file, "abc\n").unwrap();

        let mut source = detect_input_source(Some(test_file.clone())).unwrap();
        let mut contents = String::new();
        source.read_to_string(&mut contents).unwrap();
        let len = source.len_hint();
        let _ = fs::remove_file(&test_file);

        assert_eq!(contents, "abc\n");
        assert_eq!(len, Some(4));
        assert!(source.describe().ends_with("winelog_detect_read.log"));
    }

    #[test]
    fn detect_returns_file_not_found_for_missing_file() {
        let missing_file = std::env::temp_dir().join("winelog_nonexistent_12345.log");

        let result = detect_input_source(Some(missing_file.clone()));

        match result {
            Err(InputError::FileNotFound { path }) => assert_eq!(path, missing_file),
            other => panic!("Should return FileNotFound for missing file, got: {:?}", other),
        }
    }

    #[test]
    fn detect_returns_no_input_when_no_file_and_stdin_is_tty() {
        // Only meaningful when the test harness runs on a terminal.
        if std::io::stdin().is_terminal() {
            let result = detect_input_source(None);
            assert!(
                matches!(result, Err(InputError::NoInput)),
                "Expected NoInput error when no file and stdin is TTY, got: {:?}",
                result
            );
        }
    }
}
