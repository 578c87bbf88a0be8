//! Plain-text rendering of a compacted view (impure shell helpers).

pub mod constants;
pub mod row;

pub use row::{call_text, format_row, process_label, return_text, thread_label};
