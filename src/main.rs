//! Wine debug log explorer - Entry Point

use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use winelog::model::{AppError, EntryId, ProcessId, ThreadId, ThreadKey};
use winelog::parser::{parse_log, ParseOptions};
use winelog::state::{
    compact_tree, find, reveal, set_all_expanded, LogFilter, SearchDirection, SearchOptions,
    SearchQuery,
};
use winelog::view::format_row;

/// Wine debug log explorer - print the call tree of a Wine debug log
#[derive(Parser, Debug)]
#[command(name = "winelog")]
#[command(version)]
#[command(about = "Parse a Wine debug log and print its call tree")]
pub struct Args {
    /// Path to the log file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Print the parsed processes and entries as JSON
    #[arg(long)]
    pub json: bool,

    /// Reveal the first entry matching this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Search from the end of the log towards the start
    #[arg(long)]
    pub backward: bool,

    /// Start with every call expanded
    #[arg(long)]
    pub expand_all: bool,

    /// Only show entries of this process (repeatable)
    #[arg(long = "process", value_name = "PID", value_parser = ProcessId::parse)]
    pub processes: Vec<ProcessId>,

    /// Only show entries of this thread, as PID:TID (repeatable)
    #[arg(long = "thread", value_name = "PID:TID", value_parser = parse_thread_key)]
    pub threads: Vec<ThreadKey>,

    /// Hide lines that are not Wine debug output
    #[arg(long)]
    pub hide_text: bool,

    /// Let the search match lines that are not Wine debug output
    #[arg(long)]
    pub search_text: bool,

    /// Bytes requested per read (must be positive)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub chunk_size: Option<u32>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_thread_key(raw: &str) -> Result<ThreadKey, String> {
    let (pid, tid) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected PID:TID, got '{}'", raw))?;
    let pid = ProcessId::parse(pid).map_err(|e| e.to_string())?;
    let tid = ThreadId::parse(tid).map_err(|e| e.to_string())?;
    Ok((pid, tid))
}

impl Args {
    fn filter(&self, config: &winelog::config::ResolvedConfig) -> LogFilter {
        let mut filter = LogFilter {
            show_text: config.show_text,
            hide_inlined_returns: config.hide_inlined_returns,
            ..LogFilter::default()
        };
        if !self.processes.is_empty() {
            filter = filter.with_processes(self.processes.iter().copied());
        }
        if !self.threads.is_empty() {
            filter = filter.with_threads(self.threads.iter().copied());
        }
        filter
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("winelog: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode, AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = winelog::config::load_config_with_precedence(args.config.clone())?;
        let merged = winelog::config::merge_config(config_file);
        let with_env = winelog::config::apply_env_overrides(merged);

        let chunk_size_override = args.chunk_size.map(|size| size as usize);
        let search_text_override = args.search_text.then_some(true);
        let show_text_override = args.hide_text.then_some(false);

        winelog::config::apply_cli_overrides(
            with_env,
            chunk_size_override,
            search_text_override,
            show_text_override,
        )
    };

    winelog::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let input = winelog::source::detect_input_source(args.file.clone())?;
    let total = input.len_hint();
    let name = input.describe();
    info!(input = %name, total_bytes = ?total, "parsing");

    let options = ParseOptions::default()
        .with_chunk_size(config.chunk_size)
        .on_read_progress(|bytes| debug!(bytes, total = ?total, "read progress"));
    let mut result = parse_log(input, options)?;

    // Free text alone registers no process.
    if result.processes.is_empty() {
        eprintln!("winelog: {} does not look like a Wine log", name);
        return Ok(ExitCode::FAILURE);
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.json {
        serde_json::to_writer_pretty(&mut out, &result).map_err(io::Error::from)?;
        writeln!(out)?;
        out.flush()?;
        return Ok(ExitCode::SUCCESS);
    }

    let filter = args.filter(&config);
    if args.expand_all {
        set_all_expanded(&mut result.entries, true);
    }
    let mut view = compact_tree(&result.entries, Some(&filter));

    if let Some(raw) = &args.search {
        let Some(query) = SearchQuery::new(raw.as_str()) else {
            eprintln!("winelog: search text must not be empty");
            return Ok(ExitCode::FAILURE);
        };
        let direction = if args.backward {
            SearchDirection::Prev
        } else {
            SearchDirection::Next
        };
        let options = SearchOptions {
            include_text: config.search_text_entries,
        };

        match find(&result.entries, &query, direction, None, Some(&filter), options) {
            Some(index) => {
                let (revealed, position) =
                    reveal(&mut result.entries, &view, EntryId::new(index), Some(&filter));
                view = revealed;
                match position {
                    Some(row) => eprintln!("match: entry {} at row {}", index, row + 1),
                    None => eprintln!("match: entry {} (hidden)", index),
                }
            }
            None => eprintln!("no match for '{}'", query.as_str()),
        }
    }

    for id in &view {
        if let Some(entry) = result.entry(*id) {
            writeln!(out, "{}", format_row(&result, entry))?;
        }
    }
    out.flush()?;

    Ok(ExitCode::SUCCESS)
}
