use super::contract::TreeContract;
use super::reconcile::{open_tree_from_path, ReconcileReport};
use super::toggle::{register_toggle_handlers, ToggleHandlers};
use super::tree_map::{build_lookup, TreeMap};
use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// A click whose target is the given node
    Click(NodeId),
    /// Load another location: the page starts again from its server-rendered state
    Navigate(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Toggled { toggle: NodeId, active: bool },
    /// A `summary` click flipped its collapsible container
    Disclosed { container: NodeId, open: bool },
    Navigated(ReconcileReport),
    Ignored,
}

/// Owns everything one page load needs: the document, the lookup table and
/// the toggle handlers. Events are handled one at a time, to completion.
pub struct PageController {
    initial: Document,
    document: Document,
    contract: TreeContract,
    tree_map: TreeMap,
    handlers: ToggleHandlers,
    location: Option<String>,
}

impl PageController {
    pub fn load(document: Document, contract: TreeContract) -> Self {
        let handlers = register_toggle_handlers(&document, &contract);
        let tree_map = build_lookup(&document, &contract, &handlers);
        log::info!(
            "page loaded: {} lookup entries, {} toggle handlers, mode {:?}",
            tree_map.len(),
            handlers.len(),
            contract.mode
        );

        Self {
            initial: document.clone(),
            document,
            contract,
            tree_map,
            handlers,
            location: None,
        }
    }

    /// On-load reconciliation for `location`.
    pub fn on_load(&mut self, location: &str) -> ReconcileReport {
        self.location = Some(location.to_string());
        open_tree_from_path(
            &mut self.document,
            &self.tree_map,
            &self.handlers,
            &self.contract,
            location,
        )
    }

    pub fn dispatch(&mut self, event: PageEvent) -> EventOutcome {
        match event {
            PageEvent::Click(target) => {
                if let Some((toggle, active)) = self.handlers.click(&mut self.document, target) {
                    return EventOutcome::Toggled { toggle, active };
                }
                match self.disclosure_container(target) {
                    Some(container) => {
                        let open = if self.document.has_attribute(container, "open") {
                            self.document.remove_attribute(container, "open");
                            false
                        } else {
                            self.document.set_attribute(container, "open", "");
                            true
                        };
                        EventOutcome::Disclosed { container, open }
                    }
                    None => EventOutcome::Ignored,
                }
            }
            PageEvent::Navigate(location) => {
                // same markup, so node ids, the lookup and the handlers stay valid
                self.document = self.initial.clone();
                EventOutcome::Navigated(self.on_load(&location))
            }
        }
    }

    // Native <details> behaviour: a click inside its <summary> flips it.
    fn disclosure_container(&self, target: NodeId) -> Option<NodeId> {
        let summary = std::iter::once(target)
            .chain(self.document.ancestors(target))
            .find(|node| self.document.tag_name(*node) == Some("summary"))?;
        let container = self.document.parent(summary)?;
        self.document
            .matches(container, &self.contract.collapsible)
            .then_some(container)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn contract(&self) -> &TreeContract {
        &self.contract
    }

    pub fn tree_map(&self) -> &TreeMap {
        &self.tree_map
    }

    pub fn handlers(&self) -> &ToggleHandlers {
        &self.handlers
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::fixtures::{self, find_by_text};
    use crate::nav::ReconcileMode;

    #[test]
    fn load_then_click_follows_the_toggle_contract() {
        let (doc, mut contract) = fixtures::caret_page();
        contract.mode = ReconcileMode::SegmentToggle;
        let mut page = PageController::load(doc, contract);
        assert_eq!(page.tree_map().len(), 4);

        let report = page.on_load("/docs/guide.html");
        assert_eq!(report.toggled.len(), 2);
        assert_eq!(page.location(), Some("/docs/guide.html"));

        let guide = find_by_text(page.document(), "guide");
        assert_eq!(
            page.dispatch(PageEvent::Click(guide)),
            EventOutcome::Toggled { toggle: guide, active: false }
        );
        assert!(!page.handlers().is_active(page.document(), guide));
    }

    #[test]
    fn summary_click_flips_details() {
        let (doc, contract) = fixtures::details_page();
        let mut page = PageController::load(doc, contract);
        let summary = find_by_text(page.document(), "Guide");
        let details = page.document().parent(summary).unwrap();

        assert_eq!(
            page.dispatch(PageEvent::Click(summary)),
            EventOutcome::Disclosed { container: details, open: true }
        );
        assert_eq!(
            page.dispatch(PageEvent::Click(summary)),
            EventOutcome::Disclosed { container: details, open: false }
        );
    }

    #[test]
    fn click_on_plain_content_is_ignored() {
        let (doc, contract) = fixtures::details_page();
        let mut page = PageController::load(doc, contract);
        let home = find_by_text(page.document(), "Home");
        assert_eq!(page.dispatch(PageEvent::Click(home)), EventOutcome::Ignored);
    }

    #[test]
    fn navigate_starts_from_the_server_rendered_state() {
        let (doc, contract) = fixtures::details_page();
        let mut page = PageController::load(doc, contract);
        page.on_load("/docs/guide/advanced/tuning.html");
        let tuning = find_by_text(page.document(), "Tuning");
        assert!(page.document().has_attribute(tuning, "aria-current"));

        let outcome = page.dispatch(PageEvent::Navigate("/docs/guide/setup.html".to_string()));

        let EventOutcome::Navigated(report) = outcome else {
            panic!("expected a navigation, got {outcome:?}");
        };
        assert_eq!(report.opened.len(), 2);
        assert!(!page.document().has_attribute(tuning, "aria-current"));
        assert!(!page.document().has_attribute(page.document().parent(tuning).unwrap(), "open"));
    }
}
