//! Layout constants for plain-text rendering.

/// Spaces added per nesting level.
pub const INDENT_WIDTH: usize = 2;

/// Marker in front of a collapsed call that has a subtree.
pub const COLLAPSED_MARKER: &str = "+ ";

/// Marker in front of an expanded call that has a subtree.
pub const EXPANDED_MARKER: &str = "- ";

/// Placeholder for calls and inlined returns without a printed value.
pub const UNKNOWN_RETVAL: &str = "?";

/// Arrow separating a call from its return value.
pub const RETURN_ARROW: &str = "->";
