use serde::{Deserialize, Serialize};

use super::contract::TreeContract;
use super::path_key::PathKey;
use super::toggle::ToggleHandlers;
use super::tree_map::TreeMap;
use crate::dom::{Document, NodeId};

/// How the current location is turned into tree state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcileMode {
    /// Look the location up among tree links and open every collapsible ancestor
    ForceOpen,
    /// Open the ancestors of the link the server already marked as current
    CurrentMarker,
    /// Walk the path segments and toggle each matching toggle control
    SegmentToggle,
}

/// What segment-toggle reconciliation does to a matched entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentSemantics {
    /// Flip state, sharing the click handler's logic. Not idempotent.
    Toggle,
    /// Set the active and caret-down classes unconditionally.
    ForceActive,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub key: PathKey,
    /// Entry matching the full key (or the current marker)
    pub matched: Option<NodeId>,
    /// Collapsible containers that were closed and are now open
    pub opened: Vec<NodeId>,
    /// Toggles flipped or activated, with the resulting active state
    pub toggled: Vec<(NodeId, bool)>,
    /// Keys that found no entry
    pub skipped: Vec<String>,
    pub marked_current: Option<NodeId>,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        !self.opened.is_empty() || !self.toggled.is_empty() || self.marked_current.is_some()
    }

    pub fn summary(&self) -> String {
        let matched = match self.matched {
            Some(node) => node.to_string(),
            None => "no entry".to_string(),
        };
        format!(
            "{}: {matched}, {} opened, {} toggled, {} skipped",
            self.key,
            self.opened.len(),
            self.toggled.len(),
            self.skipped.len()
        )
    }
}

/// Ancestors of `node`, innermost first, for which `predicate` holds.
pub fn resolve_ancestors<P>(doc: &Document, node: NodeId, predicate: P) -> Vec<NodeId>
where
    P: Fn(&Document, NodeId) -> bool,
{
    doc.ancestors(node)
        .filter(|ancestor| predicate(doc, *ancestor))
        .collect()
}

/// Brings the tree in line with `location` according to `contract.mode`.
/// A location with no entry leaves the document untouched.
pub fn open_tree_from_path(
    doc: &mut Document,
    map: &TreeMap,
    handlers: &ToggleHandlers,
    contract: &TreeContract,
    location: &str,
) -> ReconcileReport {
    let key = contract.location_key(location);
    let mut report = ReconcileReport {
        key: key.clone(),
        ..ReconcileReport::default()
    };

    match contract.mode {
        ReconcileMode::ForceOpen => match map.get(&key.as_key()) {
            Some(link) => {
                report.matched = Some(link);
                force_open_ancestors(doc, contract, link, &mut report);
                if contract.mark_current
                    && doc.set_attribute(link, &contract.current_attribute, "page")
                {
                    report.marked_current = Some(link);
                }
            }
            None => {
                log::debug!("{key} is not part of the navigation tree");
                report.skipped.push(key.as_key());
            }
        },
        ReconcileMode::CurrentMarker => match doc.query_selector(&contract.current_link) {
            Some(link) => {
                report.matched = Some(link);
                force_open_ancestors(doc, contract, link, &mut report);
            }
            None => {
                log::debug!("no link marked with {}=page", contract.current_attribute);
                report.skipped.push(contract.current_link.to_string());
            }
        },
        ReconcileMode::SegmentToggle => {
            for prefix in key.prefixes() {
                let full = prefix.as_key();
                let entry = map
                    .get(&full)
                    .or_else(|| prefix.last_segment().and_then(|segment| map.get(segment)));
                let Some(toggle) = entry else {
                    log::debug!("segment {full:?} has no toggle, skipping");
                    report.skipped.push(full);
                    continue;
                };
                if prefix == key {
                    report.matched = Some(toggle);
                }
                match contract.segment_semantics {
                    SegmentSemantics::Toggle => {
                        if let Some(active) = handlers.flip(doc, toggle) {
                            report.toggled.push((toggle, active));
                        }
                    }
                    SegmentSemantics::ForceActive => {
                        if handlers.activate(doc, toggle) == Some(true) {
                            report.toggled.push((toggle, true));
                        }
                    }
                }
            }
        }
    }

    log::info!("reconciled {}", report.summary());
    report
}

fn force_open_ancestors(doc: &mut Document, contract: &TreeContract, node: NodeId, report: &mut ReconcileReport) {
    let collapsible = resolve_ancestors(doc, node, |doc, ancestor| doc.matches(ancestor, &contract.collapsible));
    for container in collapsible {
        // `open="open"` is already open
        if doc.has_attribute(container, "open") {
            continue;
        }
        if doc.set_attribute(container, "open", "") {
            report.opened.push(container);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::nav::fixtures::{self, find_by_text};
    use crate::nav::toggle::register_toggle_handlers;
    use crate::nav::tree_map::build_lookup;

    fn run(doc: &mut Document, contract: &TreeContract, location: &str) -> ReconcileReport {
        let handlers = register_toggle_handlers(doc, contract);
        let map = build_lookup(doc, contract, &handlers);
        open_tree_from_path(doc, &map, &handlers, contract, location)
    }

    fn is_collapsible(contract: &TreeContract) -> impl Fn(&Document, NodeId) -> bool + '_ {
        move |doc, node| doc.matches(node, &contract.collapsible)
    }

    #[test]
    fn resolve_ancestors_finds_all_three_through_plain_elements() {
        let (doc, contract) = fixtures::details_page();
        let tuning = find_by_text(&doc, "Tuning");
        let found = resolve_ancestors(&doc, tuning, is_collapsible(&contract));
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|node| doc.tag_name(*node) == Some("details")));
        // innermost first
        assert_eq!(doc.parent(tuning), Some(found[0]));
    }

    #[test]
    fn resolve_ancestors_is_empty_without_collapsibles() {
        let (doc, contract) = fixtures::details_page();
        let home = find_by_text(&doc, "Home");
        assert!(resolve_ancestors(&doc, home, is_collapsible(&contract)).is_empty());
    }

    #[test]
    fn force_open_opens_every_ancestor_of_the_matching_link() {
        let (mut doc, contract) = fixtures::details_page();
        let report = run(&mut doc, &contract, "/docs/guide/advanced/tuning.html");

        let tuning = find_by_text(&doc, "Tuning");
        assert_eq!(report.matched, Some(tuning));
        assert_eq!(report.opened.len(), 3);
        for details in resolve_ancestors(&doc, tuning, is_collapsible(&contract)) {
            assert!(doc.has_attribute(details, "open"));
        }
        assert_eq!(doc.attribute(tuning, "aria-current"), Some("page"));
    }

    #[test]
    fn force_open_leaves_unrelated_branches_alone() {
        let (mut doc, contract) = fixtures::details_page();
        run(&mut doc, &contract, "/docs/guide/setup.html");
        let tuning = find_by_text(&doc, "Tuning");
        assert!(!doc.has_attribute(doc.parent(tuning).unwrap(), "open"));
    }

    #[test]
    fn unknown_path_mutates_nothing() {
        for mode in [ReconcileMode::ForceOpen, ReconcileMode::SegmentToggle] {
            let (mut doc, mut contract) = fixtures::details_page();
            contract.mode = mode;
            let before = dom::serialize(&doc);
            let revision = doc.revision();

            let report = run(&mut doc, &contract, "/not/in/the/tree.html");

            assert!(!report.changed());
            assert_eq!(report.matched, None);
            assert_eq!(doc.revision(), revision);
            assert_eq!(dom::serialize(&doc), before);
        }
    }

    #[test]
    fn force_open_is_idempotent() {
        let (mut doc, contract) = fixtures::details_page();
        run(&mut doc, &contract, "/docs/guide/setup");
        let once = dom::serialize(&doc);
        let second = run(&mut doc, &contract, "/docs/guide/setup");
        assert!(!second.changed());
        assert_eq!(dom::serialize(&doc), once);
    }

    #[test]
    fn current_marker_opens_ancestors_of_the_marked_link() {
        let markup = fixtures::DETAILS_PAGE.replace(
            r#"<a href="/docs/guide/setup.html">"#,
            r#"<a href="/docs/guide/setup.html" aria-current="page">"#,
        );
        let mut doc = dom::parse(&markup).unwrap();
        let mut contract = fixtures::contract();
        contract.mode = ReconcileMode::CurrentMarker;

        let report = run(&mut doc, &contract, "/ignored");

        assert_eq!(report.matched, Some(find_by_text(&doc, "Setup")));
        assert_eq!(report.opened.len(), 2);
    }

    #[test]
    fn current_marker_without_marker_is_a_no_op() {
        let (mut doc, mut contract) = fixtures::details_page();
        contract.mode = ReconcileMode::CurrentMarker;
        let report = run(&mut doc, &contract, "/docs/guide/setup.html");
        assert!(!report.changed());
    }

    #[test]
    fn segment_toggle_activates_every_prefix() {
        let (mut doc, mut contract) = fixtures::caret_page();
        contract.mode = ReconcileMode::SegmentToggle;

        let report = run(&mut doc, &contract, "/docs/guide");

        let docs = find_by_text(&doc, "docs");
        let guide = find_by_text(&doc, "guide");
        assert_eq!(report.toggled, vec![(docs, true), (guide, true)]);
        assert_eq!(report.matched, Some(guide));
        for toggle in [docs, guide] {
            assert!(doc.has_class(toggle, "caret-down"));
            let container = doc.following_siblings(toggle)[0];
            assert!(doc.has_class(container, "active"));
        }
        let blog = find_by_text(&doc, "blog");
        assert!(!doc.has_class(blog, "caret-down"));
    }

    #[test]
    fn segment_toggle_with_containers_inside_the_toggles() {
        let mut doc = dom::parse(
            r#"<nav>
              <div class="caret">docs
                <ul class="nested">
                  <li><div class="caret">guide
                    <ul class="nested"><li><a href="/docs/guide/intro.html">Intro</a></li></ul>
                  </div></li>
                </ul>
              </div>
            </nav>"#,
        )
        .unwrap();
        let mut contract = fixtures::contract();
        contract.mode = ReconcileMode::SegmentToggle;
        let handlers = register_toggle_handlers(&doc, &contract);
        let map = build_lookup(&doc, &contract, &handlers);
        let keys: Vec<&str> = map.sorted().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["docs", "docs/guide", "guide"]);

        let report = open_tree_from_path(&mut doc, &map, &handlers, &contract, "/docs/guide");

        assert_eq!(report.toggled.len(), 2);
        assert!(report.toggled.iter().all(|(_, active)| *active));
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn force_open_keeps_containers_that_are_already_open() {
        let markup = fixtures::DETAILS_PAGE.replacen("<details>", r#"<details open="open">"#, 1);
        let mut doc = dom::parse(&markup).unwrap();
        let contract = fixtures::contract();

        let report = run(&mut doc, &contract, "/docs/guide/setup.html");

        let docs = doc.ancestors(find_by_text(&doc, "Docs")).next().unwrap();
        assert_eq!(doc.attribute(docs, "open"), Some("open"));
        assert!(!report.opened.contains(&docs));
        assert_eq!(report.opened.len(), 1);
    }

    #[test]
    fn segment_toggle_skips_unknown_segments() {
        let (mut doc, mut contract) = fixtures::caret_page();
        contract.mode = ReconcileMode::SegmentToggle;
        let report = run(&mut doc, &contract, "/docs/guide/intro.html");
        assert_eq!(report.toggled.len(), 2);
        assert_eq!(report.skipped, vec!["docs/guide/intro".to_string()]);
        assert_eq!(report.matched, None);
    }

    #[test]
    fn segment_toggle_twice_restores_the_initial_state() {
        let (mut doc, mut contract) = fixtures::caret_page();
        contract.mode = ReconcileMode::SegmentToggle;
        let initial = dom::serialize(&doc);

        run(&mut doc, &contract, "/docs/guide");
        assert_ne!(dom::serialize(&doc), initial);
        run(&mut doc, &contract, "/docs/guide");
        assert_eq!(dom::serialize(&doc), initial);
    }

    #[test]
    fn segment_toggle_closes_what_the_server_opened() {
        let markup = fixtures::CARET_PAGE.replacen(
            r#"<span class="caret">docs</span>
      <ul class="nested">"#,
            r#"<span class="caret caret-down">docs</span>
      <ul class="nested active">"#,
            1,
        );
        let mut doc = dom::parse(&markup).unwrap();
        let mut contract = fixtures::contract();
        contract.mode = ReconcileMode::SegmentToggle;

        let report = run(&mut doc, &contract, "/docs");

        assert_eq!(report.toggled, vec![(find_by_text(&doc, "docs"), false)]);
    }

    #[test]
    fn force_active_semantics_are_idempotent() {
        let (mut doc, mut contract) = fixtures::caret_page();
        contract.mode = ReconcileMode::SegmentToggle;
        contract.segment_semantics = SegmentSemantics::ForceActive;

        let first = run(&mut doc, &contract, "/docs/guide");
        let once = dom::serialize(&doc);
        let second = run(&mut doc, &contract, "/docs/guide");

        assert_eq!(first.toggled.len(), 2);
        assert!(second.toggled.is_empty());
        assert_eq!(dom::serialize(&doc), once);
    }
}
