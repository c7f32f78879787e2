use crate::dom::{Document, NodeId};

/// Utility functions for navigation entry labels and label paths
pub struct NodeUtils;

impl NodeUtils {
    /// Generate a full path from parent path and node name
    pub fn generate_path(parent_path: &str, node_name: &str) -> String {
        if parent_path.is_empty() {
            node_name.to_string()
        } else {
            format!("{parent_path}/{node_name}")
        }
    }

    /// Visible text of an entry with whitespace runs collapsed
    pub fn label(doc: &Document, node: NodeId) -> String {
        Self::collapse_whitespace(&doc.text_content(node))
    }

    /// Label of a toggle. When its nested container sits inside the toggle,
    /// the container's entries are not part of the label.
    pub fn toggle_label(doc: &Document, toggle: NodeId, container: Option<NodeId>) -> String {
        match container {
            Some(container) if doc.is_ancestor_of(toggle, container) => {
                Self::collapse_whitespace(&doc.text_content_without(toggle, container))
            }
            _ => Self::label(doc, toggle),
        }
    }

    fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Label of a collapsible container: the text of its `summary` child,
    /// falling back to the whole text when there is none.
    pub fn summary_label(doc: &Document, node: NodeId) -> String {
        doc.element_children(node)
            .find(|child| doc.tag_name(*child) == Some("summary"))
            .map(|summary| Self::label(doc, summary))
            .unwrap_or_else(|| Self::label(doc, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_path_skips_empty_parent() {
        assert_eq!(NodeUtils::generate_path("", "docs"), "docs");
        assert_eq!(NodeUtils::generate_path("docs", "guide"), "docs/guide");
    }

    #[test]
    fn labels_collapse_whitespace() {
        let doc = crate::dom::parse("<details><summary>\n  Getting\n  Started </summary><a href=\"/\">x</a></details>").unwrap();
        assert_eq!(NodeUtils::summary_label(&doc, doc.root()), "Getting Started");
    }

    #[test]
    fn toggle_label_leaves_out_an_inner_container() {
        let doc = crate::dom::parse(
            r#"<div class="caret"> docs <ul class="nested"><li>Intro</li></ul></div>"#,
        )
        .unwrap();
        let container = doc.element_children(doc.root()).next().unwrap();
        assert_eq!(NodeUtils::toggle_label(&doc, doc.root(), Some(container)), "docs");
        assert_eq!(NodeUtils::toggle_label(&doc, doc.root(), None), "docs Intro");
    }
}
