use std::collections::HashMap;

use super::contract::TreeContract;
use crate::dom::{Document, NodeId};

/// Click handlers for toggle controls, one per toggle, each bound to the
/// nested container it opens. Handlers take the clicked node explicitly.
#[derive(Debug, Clone, Default)]
pub struct ToggleHandlers {
    order: Vec<NodeId>,
    containers: HashMap<NodeId, NodeId>,
    toggles: HashMap<NodeId, NodeId>,
    active_class: String,
    caret_down_class: String,
}

/// Pairs every toggle control with its nested container. Toggles without a
/// container get no handler.
pub fn register_toggle_handlers(doc: &Document, contract: &TreeContract) -> ToggleHandlers {
    let mut handlers = ToggleHandlers {
        active_class: contract.active_class.clone(),
        caret_down_class: contract.caret_down_class.clone(),
        ..ToggleHandlers::default()
    };

    for toggle in doc.query_selector_all(&contract.toggles) {
        match find_container(doc, contract, toggle) {
            Some(container) => {
                handlers.order.push(toggle);
                handlers.containers.insert(toggle, container);
                handlers.toggles.insert(container, toggle);
            }
            None => log::debug!("toggle {toggle} has no nested container, no handler registered"),
        }
    }

    log::debug!("registered {} toggle handlers", handlers.order.len());
    handlers
}

// Following siblings first, then the toggle's own subtree, then anywhere
// under its parent.
fn find_container(doc: &Document, contract: &TreeContract, toggle: NodeId) -> Option<NodeId> {
    let is_nested = |node: &NodeId| *node != toggle && doc.matches(*node, &contract.nested);

    if let Some(sibling) = doc.following_siblings(toggle).into_iter().find(is_nested) {
        return Some(sibling);
    }
    if let Some(inner) = doc.descendants(toggle).into_iter().find(is_nested) {
        return Some(inner);
    }
    let parent = doc.parent(toggle)?;
    doc.descendants(parent).into_iter().find(is_nested)
}

impl ToggleHandlers {
    /// Registered toggles in document order.
    pub fn toggles(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn container_for(&self, toggle: NodeId) -> Option<NodeId> {
        self.containers.get(&toggle).copied()
    }

    pub fn toggle_for_container(&self, container: NodeId) -> Option<NodeId> {
        self.toggles.get(&container).copied()
    }

    pub fn is_active(&self, doc: &Document, toggle: NodeId) -> bool {
        self.container_for(toggle)
            .map(|container| doc.has_class(container, &self.active_class))
            .unwrap_or(false)
    }

    /// Handles a click on `target`. Like a DOM event it bubbles: the nearest
    /// registered toggle at or above `target` handles it. Returns the toggle
    /// and its container's new active state, or `None` if nothing handled it.
    pub fn click(&self, doc: &mut Document, target: NodeId) -> Option<(NodeId, bool)> {
        let toggle = std::iter::once(target)
            .chain(doc.ancestors(target))
            .find(|node| self.containers.contains_key(node))?;
        let active = self.flip(doc, toggle)?;
        log::debug!("click on {target}: toggle {toggle} now {}", if active { "open" } else { "closed" });
        Some((toggle, active))
    }

    /// Flips the container's active class and the toggle's caret-down class.
    /// Shared by click handling and segment-toggle reconciliation.
    pub fn flip(&self, doc: &mut Document, toggle: NodeId) -> Option<bool> {
        let container = self.container_for(toggle)?;
        let active = doc.toggle_class(container, &self.active_class);
        doc.toggle_class(toggle, &self.caret_down_class);
        Some(active)
    }

    /// Sets both classes without flipping. Returns whether anything changed.
    pub fn activate(&self, doc: &mut Document, toggle: NodeId) -> Option<bool> {
        let container = self.container_for(toggle)?;
        let opened = doc.add_class(container, &self.active_class);
        let pointed = doc.add_class(toggle, &self.caret_down_class);
        Some(opened || pointed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::fixtures;

    #[test]
    fn pairs_toggles_with_sibling_containers() {
        let (doc, contract) = fixtures::caret_page();
        let handlers = register_toggle_handlers(&doc, &contract);
        assert_eq!(handlers.len(), 3);
        for toggle in handlers.toggles() {
            let container = handlers.container_for(*toggle).unwrap();
            assert_eq!(doc.parent(container), doc.parent(*toggle));
            assert_eq!(handlers.toggle_for_container(container), Some(*toggle));
        }
    }

    #[test]
    fn click_twice_reverts_container_and_caret() {
        let (mut doc, contract) = fixtures::caret_page();
        let handlers = register_toggle_handlers(&doc, &contract);
        let toggle = handlers.toggles()[0];
        let container = handlers.container_for(toggle).unwrap();

        assert_eq!(handlers.click(&mut doc, toggle), Some((toggle, true)));
        assert!(doc.has_class(container, "active"));
        assert!(doc.has_class(toggle, "caret-down"));

        assert_eq!(handlers.click(&mut doc, toggle), Some((toggle, false)));
        assert!(!doc.has_class(container, "active"));
        assert!(!doc.has_class(toggle, "caret-down"));
    }

    #[test]
    fn click_bubbles_from_inner_elements() {
        let (mut doc, contract) = fixtures::caret_page();
        let handlers = register_toggle_handlers(&doc, &contract);
        let toggle = handlers.toggles()[0];
        let label = doc.children(toggle)[0];
        assert_eq!(handlers.click(&mut doc, label), Some((toggle, true)));
    }

    #[test]
    fn click_outside_any_toggle_is_ignored() {
        let (mut doc, contract) = fixtures::caret_page();
        let handlers = register_toggle_handlers(&doc, &contract);
        let before = doc.revision();
        let root = doc.root();
        assert_eq!(handlers.click(&mut doc, root), None);
        assert_eq!(doc.revision(), before);
    }

    #[test]
    fn container_inside_the_toggle_is_found() {
        let doc = crate::dom::parse(
            r#"<nav><div class="caret">Docs<ul class="nested"><li>Guide</li></ul></div></nav>"#,
        )
        .unwrap();
        let contract = fixtures::contract();
        let handlers = register_toggle_handlers(&doc, &contract);
        let toggle = handlers.toggles()[0];
        let container = handlers.container_for(toggle).unwrap();
        assert!(doc.is_ancestor_of(toggle, container));
    }

    #[test]
    fn toggle_without_container_gets_no_handler() {
        let doc = crate::dom::parse(r#"<nav><span class="caret">Lonely</span></nav>"#).unwrap();
        let handlers = register_toggle_handlers(&doc, &fixtures::contract());
        assert!(handlers.is_empty());
    }
}
