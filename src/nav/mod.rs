//! Keeps a navigation tree's expand/collapse state in step with the current
//! page: build a lookup from path keys or labels to tree entries, open the
//! entries leading to the current location, and handle toggle clicks.

mod contract;
mod page;
mod path_key;
mod reconcile;
mod toggle;
mod tree_map;

#[cfg(test)]
mod fixtures;

pub use contract::TreeContract;
pub use page::{EventOutcome, PageController, PageEvent};
pub use path_key::{PathKey, PathNormalizer};
pub use reconcile::{open_tree_from_path, resolve_ancestors, ReconcileMode, ReconcileReport, SegmentSemantics};
pub use toggle::{register_toggle_handlers, ToggleHandlers};
pub use tree_map::{build_link_lookup, build_lookup, build_toggle_lookup, TreeMap};
