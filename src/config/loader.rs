//! Configuration file loading with precedence handling.

use crate::source::DEFAULT_CHUNK_SIZE;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "WINELOG_CONFIG";
/// Environment variable overriding the read chunk size.
pub const ENV_CHUNK_SIZE: &str = "WINELOG_CHUNK_SIZE";
/// Environment variable enabling search of free-text lines.
pub const ENV_SEARCH_TEXT: &str = "WINELOG_SEARCH_TEXT";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/winelog/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Bytes requested per read.
    #[serde(default)]
    pub chunk_size: Option<usize>,

    /// Match search queries against free-text lines too.
    #[serde(default)]
    pub search_text_entries: Option<bool>,

    /// Fold the return of an inlinable call into the call's row.
    #[serde(default)]
    pub hide_inlined_returns: Option<bool>,

    /// Show free-text lines in the tree.
    #[serde(default)]
    pub show_text: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Bytes requested per read. Never zero.
    pub chunk_size: usize,
    /// Search free-text lines.
    pub search_text_entries: bool,
    /// Fold inlinable returns into their call.
    pub hide_inlined_returns: bool,
    /// Show free-text lines.
    pub show_text: bool,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            search_text_entries: false,
            hide_inlined_returns: true,
            show_text: true,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/winelog/winelog.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("winelog").join("winelog.log")
    } else {
        PathBuf::from("winelog.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/winelog/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("winelog").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `WINELOG_CONFIG` environment variable
/// 3. Default path `~/.config/winelog/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed,
/// or if `WINELOG_CONFIG` is not valid unicode.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(ENV_CONFIG) {
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Accept a chunk size only if it is non-zero.
fn valid_chunk_size(chunk_size: usize, source: &str) -> Option<usize> {
    if chunk_size == 0 {
        warn!(source, "chunk size must be positive, keeping previous value");
        None
    } else {
        Some(chunk_size)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `WINELOG_CHUNK_SIZE`: positive integer
/// - `WINELOG_SEARCH_TEXT`: `1`/`true`/`yes`/`on` or `0`/`false`/`no`/`off`
///
/// Unparseable values are logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(ENV_CHUNK_SIZE) {
        match raw.trim().parse::<usize>() {
            Ok(size) => {
                if let Some(size) = valid_chunk_size(size, ENV_CHUNK_SIZE) {
                    config.chunk_size = size;
                }
            }
            Err(_) => warn!(value = %raw, "ignoring {}", ENV_CHUNK_SIZE),
        }
    }

    if let Ok(raw) = std::env::var(ENV_SEARCH_TEXT) {
        match parse_flag(&raw) {
            Some(flag) => config.search_text_entries = flag,
            None => warn!(value = %raw, "ignoring {}", ENV_SEARCH_TEXT),
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
/// A zero chunk size falls back to the default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        chunk_size: config
            .chunk_size
            .and_then(|size| valid_chunk_size(size, "config file"))
            .unwrap_or(defaults.chunk_size),
        search_text_entries: config
            .search_text_entries
            .unwrap_or(defaults.search_text_entries),
        hide_inlined_returns: config
            .hide_inlined_returns
            .unwrap_or(defaults.hide_inlined_returns),
        show_text: config.show_text.unwrap_or(defaults.show_text),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    chunk_size_override: Option<usize>,
    search_text_override: Option<bool>,
    show_text_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(size) = chunk_size_override.and_then(|size| valid_chunk_size(size, "--chunk-size"))
    {
        config.chunk_size = size;
    }

    if let Some(search_text) = search_text_override {
        config.search_text_entries = search_text;
    }

    if let Some(show_text) = show_text_override {
        config.show_text = show_text;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
