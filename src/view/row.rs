//! One-line rendering of entries.
//!
//! A row looks like
//!
//! ```text
//! [process.exe (00c8) main (00cc)]   + KERNEL32.CreateFileW(0012f5a0, 80000000)
//! ```
//!
//! with the badge naming the emitting process and thread, indentation by call
//! depth and a collapse marker on calls that own a subtree. Text entries have
//! no badge.

use crate::model::{CallEntry, LogEntry, LogParseResult, LogProcess, LogThread, ReturnEntry};
use crate::state::tree::depth;
use crate::view::constants::{
    COLLAPSED_MARKER, EXPANDED_MARKER, INDENT_WIDTH, RETURN_ARROW, UNKNOWN_RETVAL,
};

/// `"name (id)"` for a named process, else the bare id.
pub fn process_label(process: &LogProcess) -> String {
    label(process.name.as_deref(), &process.id)
}

/// `"name (id)"` for a named thread, else the bare id.
pub fn thread_label(thread: &LogThread) -> String {
    label(thread.name.as_deref(), &thread.id)
}

fn label(name: Option<&str>, id: &dyn std::fmt::Display) -> String {
    match name {
        Some(name) => format!("{} ({})", name, id),
        None => id.to_string(),
    }
}

/// Body of a call row: `module.func(arg, arg)`, plus ` -> retval` when the
/// call is inlinable and its return is folded into the same row.
pub fn call_text(call: &CallEntry, entries: &[LogEntry]) -> String {
    let args = call.args.as_deref().unwrap_or_default().join(", ");
    let mut text = format!("{}.{}({})", call.module, call.func, args);
    if call.inlinable {
        let retval = call
            .return_id
            .and_then(|id| entries.get(id.get()))
            .and_then(LogEntry::as_return)
            .and_then(|ret| ret.retval.as_deref())
            .unwrap_or(UNKNOWN_RETVAL);
        text.push_str(&format!(" {} {}", RETURN_ARROW, retval));
    }
    text
}

/// Body of a return row: `-> retval`.
pub fn return_text(ret: &ReturnEntry) -> String {
    format!(
        "{} {}",
        RETURN_ARROW,
        ret.retval.as_deref().unwrap_or(UNKNOWN_RETVAL)
    )
}

/// Render one entry of `result` as a single line.
pub fn format_row(result: &LogParseResult, entry: &LogEntry) -> String {
    let entries = &result.entries;
    let indent = " ".repeat(depth(entries, entry) * INDENT_WIDTH);

    let body = match entry {
        LogEntry::Text(text) => return format!("{}{}", indent, text.text),
        LogEntry::Call(call) => {
            let marker = match (call.inlinable, call.is_expanded) {
                (true, _) => "",
                (false, true) => EXPANDED_MARKER,
                (false, false) => COLLAPSED_MARKER,
            };
            format!("{}{}", marker, call_text(call, entries))
        }
        LogEntry::Return(ret) => return_text(ret),
        LogEntry::Message(msg) => {
            if msg.channel.is_empty() && msg.logger.is_empty() {
                msg.message.clone()
            } else {
                format!("{}:{} {}", msg.channel, msg.logger, msg.message)
            }
        }
    };

    let badge = entry.origin().map(|(pid, tid)| {
        let process = result
            .process(pid)
            .map(process_label)
            .unwrap_or_else(|| pid.to_string());
        let thread = result
            .thread((pid, tid))
            .map(thread_label)
            .unwrap_or_else(|| tid.to_string());
        format!("[{} {}] ", process, thread)
    });

    format!("{}{}{}", badge.unwrap_or_default(), indent, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use crate::state::tree::set_all_expanded;

    const LOG: &str = r#"00aa:00aa:trace:module:get_load_order looking for L"C:\\windows\\game.exe"
00aa:00ab:warn:threadname:NtSetInformationThread Thread renamed to L"render"
00aa:00ab:Call KERNEL32.Sleep(00000001) ret=10
00aa:00ab:Ret  KERNEL32.Sleep() retval=00000000 ret=10
00aa:00ab:Call KERNEL32.CreateFileW(0012f5a0,80000000) ret=11
00aa:00ab:trace:file:CreateFileW opening
00aa:00ab:Ret  KERNEL32.CreateFileW() retval=00000044 ret=11
00aa:00ab:Starting thread proc
wineserver: shutting down"#;

    fn rows(result: &LogParseResult) -> Vec<String> {
        result
            .entries
            .iter()
            .map(|entry| format_row(result, entry))
            .collect()
    }

    #[test]
    fn labels_prefer_names() {
        let result = parse_str(LOG).unwrap();
        let process = &result.processes[0];
        assert_eq!(process_label(process), "game.exe (00aa)");
        assert_eq!(thread_label(&process.threads[0]), "00aa");
        assert_eq!(thread_label(&process.threads[1]), "render (00ab)");
    }

    #[test]
    fn rows_show_badges_depth_and_markers() {
        let mut result = parse_str(LOG).unwrap();
        set_all_expanded(&mut result.entries, true);
        let rows = rows(&result);

        assert_eq!(
            rows[0],
            r#"[game.exe (00aa) 00aa] module:get_load_order looking for L"C:\\windows\\game.exe""#
        );
        assert_eq!(
            rows[2],
            "[game.exe (00aa) render (00ab)] KERNEL32.Sleep(00000001) -> 00000000"
        );
        assert_eq!(
            rows[4],
            "[game.exe (00aa) render (00ab)] - KERNEL32.CreateFileW(0012f5a0, 80000000)"
        );
        assert_eq!(
            rows[5],
            "[game.exe (00aa) render (00ab)]   file:CreateFileW opening"
        );
        assert_eq!(rows[6], "[game.exe (00aa) render (00ab)] -> 00000044");
        assert_eq!(rows[7], "[game.exe (00aa) render (00ab)] Starting thread proc");
        assert_eq!(rows[8], "wineserver: shutting down");
    }

    #[test]
    fn collapsed_calls_use_the_collapsed_marker() {
        let result = parse_str(LOG).unwrap();
        assert!(format_row(&result, &result.entries[4]).contains("+ KERNEL32.CreateFileW"));
    }

    #[test]
    fn return_without_value_renders_placeholder() {
        let result = parse_str("00c8:00cc:Call K.F() ret=1\n00c8:00cc:Ret  K.F() ret=1").unwrap();
        assert_eq!(format_row(&result, &result.entries[0]), "[00c8 00cc] K.F() -> ?");
        assert_eq!(format_row(&result, &result.entries[1]), "[00c8 00cc] -> ?");
    }
}
