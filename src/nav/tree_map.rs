use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::contract::TreeContract;
use super::reconcile::ReconcileMode;
use super::toggle::ToggleHandlers;
use crate::dom::{Document, NodeId};
use crate::node_utils::NodeUtils;

/// Lookup from a path key or label path to the tree entry it names. Rebuilt
/// on every page load and owned by the page controller.
#[derive(Debug, Clone, Default)]
pub struct TreeMap {
    entries: HashMap<String, NodeId>,
}

impl TreeMap {
    /// Inserts under `key`; the last write wins.
    pub fn insert(&mut self, key: String, node: NodeId) {
        if let Some(previous) = self.entries.insert(key.clone(), node) {
            if previous != node {
                log::debug!("tree map key {key:?} moved from {previous} to {node}");
            }
        }
    }

    /// Inserts only when `key` is still free.
    fn insert_alias(&mut self, key: String, node: NodeId) {
        if let Entry::Vacant(slot) = self.entries.entry(key) {
            slot.insert(node);
        }
    }

    pub fn get(&self, key: &str) -> Option<NodeId> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key.
    pub fn sorted(&self) -> Vec<(&str, NodeId)> {
        let mut entries: Vec<(&str, NodeId)> = self
            .entries
            .iter()
            .map(|(key, node)| (key.as_str(), *node))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Builds the lookup the configured mode reconciles against: toggle labels
/// for segment-toggle, link destinations otherwise.
pub fn build_lookup(doc: &Document, contract: &TreeContract, handlers: &ToggleHandlers) -> TreeMap {
    match contract.mode {
        ReconcileMode::SegmentToggle => build_toggle_lookup(doc, handlers),
        ReconcileMode::ForceOpen | ReconcileMode::CurrentMarker => build_link_lookup(doc, contract),
    }
}

/// Tree links keyed by the path key of their resolved `href`.
pub fn build_link_lookup(doc: &Document, contract: &TreeContract) -> TreeMap {
    let mut map = TreeMap::default();
    for link in doc.query_selector_all(&contract.links) {
        let Some(href) = doc.attribute(link, "href") else {
            continue;
        };
        if let Some(key) = contract.link_key(href) {
            map.insert(key.as_key(), link);
        }
    }
    log::debug!("built link lookup with {} entries", map.len());
    map
}

/// Toggles keyed by their label path (`docs/guide`), plus their bare label
/// (`guide`) wherever no label path already claims it.
pub fn build_toggle_lookup(doc: &Document, handlers: &ToggleHandlers) -> TreeMap {
    let mut map = TreeMap::default();
    let mut aliases = Vec::new();

    for toggle in handlers.toggles() {
        let label = NodeUtils::toggle_label(doc, *toggle, handlers.container_for(*toggle));
        if label.is_empty() {
            continue;
        }
        let path = enclosing_labels(doc, handlers, *toggle)
            .iter()
            .fold(String::new(), |acc, parent| NodeUtils::generate_path(&acc, parent));
        map.insert(NodeUtils::generate_path(&path, &label), *toggle);
        aliases.push((label, *toggle));
    }
    for (label, toggle) in aliases {
        map.insert_alias(label, toggle);
    }

    log::debug!("built toggle lookup with {} entries", map.len());
    map
}

// Labels of the toggles whose containers enclose `toggle`, outermost first.
fn enclosing_labels(doc: &Document, handlers: &ToggleHandlers, toggle: NodeId) -> Vec<String> {
    let mut labels = Vec::new();
    let mut current = toggle;
    while let Some(parent_toggle) = doc
        .ancestors(current)
        .find_map(|ancestor| handlers.toggle_for_container(ancestor))
    {
        // a container nested inside its own toggle can pair back onto itself
        if parent_toggle == current || labels.len() > doc.len() {
            break;
        }
        labels.push(NodeUtils::toggle_label(doc, parent_toggle, handlers.container_for(parent_toggle)));
        current = parent_toggle;
    }
    labels.reverse();
    labels
}
