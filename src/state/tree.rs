//! Call-tree navigation over a parsed entry sequence.
//!
//! A *view* is the ordered list of entry ids currently shown: every entry
//! whose ancestors are all expanded and that passes the active filter. Views
//! are always sorted by id, which is what lets [`compact_tree_for_call`] splice
//! a recomputed subtree into an existing view without rescanning the log.

use crate::model::{EntryId, LogEntry};
use crate::state::filter::{passes, EntryPredicate};
use std::iter;

// ===== Structure =====

/// Strict ancestors of `entry`, innermost first.
pub fn ancestors<'a>(
    entries: &'a [LogEntry],
    entry: &LogEntry,
) -> impl Iterator<Item = &'a LogEntry> + 'a {
    let first = entry.parent().and_then(|id| entries.get(id.get()));
    iter::successors(first, move |current| {
        current.parent().and_then(|id| entries.get(id.get()))
    })
}

/// Nesting depth of `entry`.
///
/// A return sits at the depth of the call it closes, so its parent link does
/// not count.
pub fn depth(entries: &[LogEntry], entry: &LogEntry) -> usize {
    let count = ancestors(entries, entry).count();
    if entry.is_return() {
        count.saturating_sub(1)
    } else {
        count
    }
}

/// Returns true if every ancestor of `entry` is expanded.
pub fn is_visible(entries: &[LogEntry], entry: &LogEntry) -> bool {
    ancestors(entries, entry)
        .all(|ancestor| ancestor.as_call().is_some_and(|call| call.is_expanded))
}

// ===== Compaction =====

/// Ids of all entries that are visible and pass `filter`, in order.
pub fn compact_tree(entries: &[LogEntry], filter: Option<&dyn EntryPredicate>) -> Vec<EntryId> {
    compact_slice(entries, entries, filter)
}

/// Recompute `view` after the expansion state of `call` changed.
///
/// The prefix of the view up to `call` and the suffix after its return are
/// kept as they are; only the entries between the two are re-examined. If the
/// call is not part of the view the view is returned unchanged. For a call
/// that never returned the subtree runs to the end of the log.
pub fn compact_tree_for_call(
    view: &[EntryId],
    entries: &[LogEntry],
    call: EntryId,
    filter: Option<&dyn EntryPredicate>,
) -> Vec<EntryId> {
    let Ok(position) = view.binary_search(&call) else {
        return view.to_vec();
    };
    let return_id = entries
        .get(call.get())
        .and_then(LogEntry::as_call)
        .and_then(|call| call.return_id);

    let start = (call.get() + 1).min(entries.len());
    let end = return_id.map_or(entries.len(), |id| (id.get() + 1).min(entries.len()));
    let suffix: &[EntryId] = match return_id {
        Some(id) => &view[view.partition_point(|&viewed| viewed <= id)..],
        None => &[],
    };

    let mut compacted = view[..=position].to_vec();
    compacted.extend(compact_slice(entries, &entries[start..end], filter));
    compacted.extend_from_slice(suffix);
    compacted
}

fn compact_slice(
    entries: &[LogEntry],
    slice: &[LogEntry],
    filter: Option<&dyn EntryPredicate>,
) -> Vec<EntryId> {
    slice
        .iter()
        .filter(|entry| is_visible(entries, entry) && passes(filter, entries, entry))
        .map(LogEntry::id)
        .collect()
}

// ===== Expansion =====

/// Flip the expansion state of `call` and return the updated view.
///
/// Ids that do not name a call leave both the entries and the view untouched.
pub fn toggle_expanded(
    entries: &mut [LogEntry],
    view: &[EntryId],
    call: EntryId,
    filter: Option<&dyn EntryPredicate>,
) -> Vec<EntryId> {
    let Some(target) = entries.get_mut(call.get()).and_then(LogEntry::as_call_mut) else {
        return view.to_vec();
    };
    target.is_expanded = !target.is_expanded;
    compact_tree_for_call(view, entries, call, filter)
}

/// Expand or collapse every call at once.
pub fn set_all_expanded(entries: &mut [LogEntry], expanded: bool) {
    for call in entries.iter_mut().filter_map(LogEntry::as_call_mut) {
        call.is_expanded = expanded;
    }
}

/// Make `target` visible by expanding its collapsed ancestors.
///
/// Returns the updated view and the position of `target` in it, which is
/// `None` when the filter hides the entry.
pub fn reveal(
    entries: &mut [LogEntry],
    view: &[EntryId],
    target: EntryId,
    filter: Option<&dyn EntryPredicate>,
) -> (Vec<EntryId>, Option<usize>) {
    let Some(entry) = entries.get(target.get()) else {
        return (view.to_vec(), None);
    };
    let collapsed: Vec<EntryId> = ancestors(entries, entry)
        .filter_map(LogEntry::as_call)
        .filter(|call| !call.is_expanded)
        .map(|call| call.id)
        .collect();

    let view = match collapsed.last() {
        None => view.to_vec(),
        Some(&outermost) => {
            for id in &collapsed {
                if let Some(call) = entries.get_mut(id.get()).and_then(LogEntry::as_call_mut) {
                    call.is_expanded = true;
                }
            }
            if view.binary_search(&outermost).is_ok() {
                compact_tree_for_call(view, entries, outermost, filter)
            } else {
                // Outermost call is filtered out; nothing to splice into.
                compact_tree(entries, filter)
            }
        }
    };

    let position = view.binary_search(&target).ok();
    (view, position)
}
