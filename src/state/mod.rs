//! Navigation state over a parsed log (pure).
//!
//! Everything here operates on a caller-owned entry sequence; the only state
//! mutated is `is_expanded` on call entries.

pub mod filter;
pub mod search;
pub mod tree;

// Re-export for convenience
pub use filter::{EntryPredicate, LogFilter};
pub use search::{entry_matches, find, SearchDirection, SearchOptions, SearchQuery};
pub use tree::{
    ancestors, compact_tree, compact_tree_for_call, depth, is_visible, reveal, set_all_expanded,
    toggle_expanded,
};
