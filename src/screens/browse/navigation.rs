use super::types::{RowKind, TreeRow};
use crate::dom::NodeId;
use crate::nav::{EventOutcome, PageEvent};
use crate::node_utils::NodeUtils;

impl super::BrowseScreen {
    // Rebuild the visible rows from the document, keeping the selection on
    // the same node when it is still visible
    pub fn rebuild_rows(&mut self) {
        let selected_node = self.selected_row().map(|row| row.node);

        let doc = self.page.document();
        let contract = self.page.contract();
        let roots: Vec<NodeId> = doc
            .query_selector_all(&contract.nav_root)
            .into_iter()
            .filter(|root| !doc.ancestors(*root).any(|a| doc.matches(a, &contract.nav_root)))
            .collect();
        let roots = if roots.is_empty() { vec![doc.root()] } else { roots };

        let mut rows = Vec::new();
        for root in roots {
            self.collect_rows(root, 0, None, &mut rows);
        }
        self.tree_rows = rows;

        if let Some(node) = selected_node {
            if let Some(index) = self.tree_rows.iter().position(|row| row.node == node) {
                self.selected_row_index = index;
            }
        }
        if self.selected_row_index >= self.tree_rows.len() {
            self.selected_row_index = self.tree_rows.len().saturating_sub(1);
        }
    }

    fn collect_rows(&self, node: NodeId, level: usize, skip: Option<NodeId>, rows: &mut Vec<TreeRow>) {
        let doc = self.page.document();
        let contract = self.page.contract();
        let handlers = self.page.handlers();

        for child in doc.element_children(node) {
            if Some(child) == skip {
                continue;
            }

            if doc.matches(child, &contract.collapsible) {
                let summary = doc
                    .element_children(child)
                    .find(|c| doc.tag_name(*c) == Some("summary"));
                let is_expanded = doc.has_attribute(child, "open");
                rows.push(TreeRow {
                    node: child,
                    click_target: summary.unwrap_or(child),
                    name: NodeUtils::summary_label(doc, child),
                    kind: RowKind::Collapsible,
                    level,
                    has_children: doc.element_children(child).any(|c| Some(c) != summary),
                    is_expanded,
                    is_current: false,
                    href: None,
                });
                if is_expanded {
                    self.collect_rows(child, level + 1, summary, rows);
                }
            } else if let Some(container) = handlers.container_for(child) {
                let is_expanded = handlers.is_active(doc, child);
                rows.push(TreeRow {
                    node: child,
                    click_target: child,
                    name: NodeUtils::toggle_label(doc, child, Some(container)),
                    kind: RowKind::Toggle,
                    level,
                    has_children: doc.element_children(container).next().is_some(),
                    is_expanded,
                    is_current: false,
                    href: None,
                });
                // containers outside the toggle are reached by the walk itself
                if is_expanded && doc.is_ancestor_of(child, container) {
                    self.collect_rows(container, level + 1, None, rows);
                }
            } else if let Some(toggle) = handlers.toggle_for_container(child) {
                if !doc.is_ancestor_of(toggle, child) && handlers.is_active(doc, toggle) {
                    self.collect_rows(child, level + 1, None, rows);
                }
            } else if doc.matches(child, &contract.links) && doc.has_attribute(child, "href") {
                rows.push(TreeRow {
                    node: child,
                    click_target: child,
                    name: NodeUtils::label(doc, child),
                    kind: RowKind::Link,
                    level,
                    has_children: false,
                    is_expanded: false,
                    is_current: doc.attribute(child, &contract.current_attribute) == Some("page"),
                    href: doc.attribute(child, "href").map(str::to_string),
                });
            } else {
                self.collect_rows(child, level, None, rows);
            }
        }
    }

    // Check if a row can be expanded
    pub fn can_expand(&self, index: usize) -> bool {
        self.tree_rows
            .get(index)
            .map(|row| row.should_show_expand_indicator() && !row.is_expanded)
            .unwrap_or(false)
    }

    // Check if a row can be collapsed
    pub fn can_collapse(&self, index: usize) -> bool {
        self.tree_rows
            .get(index)
            .map(|row| row.should_show_expand_indicator() && row.is_expanded)
            .unwrap_or(false)
    }

    /// Activate a row the way a click in the page would: toggles flip,
    /// summaries disclose, links navigate.
    pub fn click_row(&mut self, index: usize) {
        let Some(row) = self.tree_rows.get(index).cloned() else {
            log::warn!("browse: cannot click row, index {index} out of bounds");
            return;
        };

        let event = match (&row.kind, &row.href) {
            (RowKind::Link, Some(href)) => PageEvent::Navigate(href.clone()),
            _ => PageEvent::Click(row.click_target),
        };

        match self.page.dispatch(event) {
            EventOutcome::Toggled { active, .. } => {
                log::info!("{} {}", if active { "opened" } else { "closed" }, row.name);
            }
            EventOutcome::Disclosed { open, .. } => {
                log::info!("{} {}", if open { "expanded" } else { "collapsed" }, row.name);
            }
            EventOutcome::Navigated(report) => {
                self.last_report = Some(report);
                self.rebuild_rows();
                self.select_current_row();
                return;
            }
            EventOutcome::Ignored => {
                log::debug!("browse: click on {} had no handler", row.name);
            }
        }
        self.rebuild_rows();
    }

    /// Re-run on-load reconciliation for a new location
    pub fn navigate_to(&mut self, location: &str) {
        let location = location.trim();
        if location.is_empty() {
            return;
        }
        if let EventOutcome::Navigated(report) = self.page.dispatch(PageEvent::Navigate(location.to_string())) {
            self.last_report = Some(report);
        }
        self.rebuild_rows();
        self.select_current_row();
    }

    pub fn apply_initial_location(&mut self, location: &str) {
        let report = self.page.on_load(location);
        self.last_report = Some(report);
        self.rebuild_rows();
        self.select_current_row();
    }

    // Put the selection on the entry the last reconciliation matched
    fn select_current_row(&mut self) {
        let matched = self.last_report.as_ref().and_then(|report| report.matched);
        let index = self
            .tree_rows
            .iter()
            .position(|row| Some(row.node) == matched || row.is_current);
        if let Some(index) = index {
            self.selected_row_index = index;
            self.update_scroll();
        }
    }

    // Move to parent row
    pub fn move_to_parent(&mut self) {
        if self.selected_row_index >= self.tree_rows.len() {
            log::warn!("browse: cannot move to parent, selected index out of bounds");
            return;
        }

        let current_level = self.tree_rows[self.selected_row_index].level;
        if current_level == 0 {
            log::debug!("browse: already at root level, cannot move to parent");
            return;
        }

        for i in (0..self.selected_row_index).rev() {
            if self.tree_rows[i].level == current_level - 1 {
                self.selected_row_index = i;
                self.update_scroll();
                break;
            }
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.tree_rows.is_empty() {
            return;
        }
        let last = self.tree_rows.len() - 1;
        self.selected_row_index = self
            .selected_row_index
            .saturating_add_signed(delta)
            .min(last);
        self.update_scroll();
    }

    // Update scroll position
    pub fn update_scroll(&mut self) {
        self.update_scroll_with_height(self.current_visible_height);
    }

    pub fn update_scroll_with_height(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }

        // Calculate 25% zones
        let top_25_percent = visible_height / 4;
        let bottom_25_percent = visible_height.saturating_sub(visible_height / 4);

        let current_visible_position = self.selected_row_index.saturating_sub(self.scroll_offset);

        if self.selected_row_index < self.scroll_offset {
            // Above visible area - position it at 25% from top
            self.scroll_offset = self.selected_row_index.saturating_sub(top_25_percent);
        } else if self.selected_row_index >= self.scroll_offset + visible_height {
            // Below visible area - position it at 75% from top
            let target_position = (visible_height * 3) / 4;
            self.scroll_offset = self.selected_row_index.saturating_sub(target_position);
        } else if current_visible_position < top_25_percent {
            self.scroll_offset = self.selected_row_index.saturating_sub(top_25_percent);
        } else if current_visible_position >= bottom_25_percent {
            let target_position = (visible_height * 3) / 4;
            self.scroll_offset = self.selected_row_index.saturating_sub(target_position);
        }
        // Middle 50%: no scrolling needed
    }
}
