use anyhow::{bail, Result};
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use std::fmt::Write;

use super::document::{Document, NodeData, NodeId};

// Elements written without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

// Elements closed by an opening tag of the same name, as in `<li>a<li>b`.
const SELF_NESTING_CLOSES: &[&str] = &["li", "p", "dt", "dd", "option", "tr", "td", "th"];

// Elements whose text is written back unescaped.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Builds a [`Document`] from the tokenizer's start/end tags. Unclosed
/// elements end where an ancestor ends or at end of input; stray end tags
/// are ignored.
#[derive(Default)]
struct TreeBuilder {
    document: Option<Document>,
    open: Vec<NodeId>,
    doctype: Option<String>,
    extra_roots: Vec<String>,
    parse_errors: usize,
}

impl TreeBuilder {
    fn start_tag(&mut self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        let attributes: Vec<(String, String)> = tag
            .attrs
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        let borrowed: Vec<(&str, &str)> = attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let has_content = !tag.self_closing && !VOID_ELEMENTS.contains(&name.as_str());

        let node = if let Some(document) = self.document.as_mut() {
            let Some(mut parent) = self.open.last().copied() else {
                self.extra_roots.push(name);
                return TokenSinkResult::Continue;
            };
            if SELF_NESTING_CLOSES.contains(&name.as_str()) && document.tag_name(parent) == Some(name.as_str()) {
                self.open.pop();
                parent = self.open.last().copied().unwrap_or(parent);
            }
            document.append_element(parent, &name, &borrowed)
        } else {
            let mut document = Document::new(&name);
            let root = document.root();
            for (attr, value) in &borrowed {
                document.set_attribute(root, attr, value);
            }
            self.document = Some(document);
            root
        };

        if !has_content {
            return TokenSinkResult::Continue;
        }
        self.open.push(node);
        match name.as_str() {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" => TokenSinkResult::RawData(RawKind::Rawtext),
            "textarea" | "title" => TokenSinkResult::RawData(RawKind::Rcdata),
            _ => TokenSinkResult::Continue,
        }
    }

    fn end_tag(&mut self, name: &str) {
        let Some(document) = &self.document else {
            return;
        };
        match self.open.iter().rposition(|node| document.tag_name(*node) == Some(name)) {
            Some(position) => self.open.truncate(position),
            None => log::trace!("ignoring stray </{name}>"),
        }
    }

    fn text(&mut self, text: &StrTendril) {
        match (&mut self.document, self.open.last()) {
            (Some(document), Some(parent)) => {
                document.append_text(*parent, text);
            }
            _ if text.trim().is_empty() => {}
            _ => log::debug!("dropping text outside the root element: {:?}", text.trim()),
        }
    }

    fn finish(self) -> Result<Document> {
        if !self.extra_roots.is_empty() {
            bail!(
                "navigation markup has more than one root element (extra: {})",
                self.extra_roots.join(", ")
            );
        }
        let Some(mut document) = self.document else {
            bail!("navigation markup has no elements");
        };
        if let Some(doctype) = &self.doctype {
            document.set_doctype(doctype);
        }
        if self.parse_errors > 0 {
            log::debug!("recovered from {} markup errors", self.parse_errors);
        }
        Ok(document)
    }
}

impl TokenSink for TreeBuilder {
    type Handle = ();

    fn process_token(&mut self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::DoctypeToken(doctype) => {
                let name = doctype.name.map(|name| name.to_string());
                self.doctype = Some(name.unwrap_or_else(|| "html".to_string()));
            }
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return self.start_tag(tag),
                TagKind::EndTag => self.end_tag(&tag.name),
            },
            Token::CharacterTokens(text) => self.text(&text),
            Token::ParseError(error) => {
                log::trace!("line {line_number}: {error}");
                self.parse_errors += 1;
            }
            // comments are dropped
            Token::CommentToken(_) | Token::NullCharacterToken | Token::EOFToken => {}
        }
        TokenSinkResult::Continue
    }
}

/// Loads navigation markup: a full HTML page or a fragment with a single
/// root element. Parsing is as lenient as a browser's tokenizer.
pub fn parse(markup: &str) -> Result<Document> {
    let mut input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(markup));

    let mut tokenizer = Tokenizer::new(TreeBuilder::default(), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();

    let document = tokenizer.sink.finish()?;
    log::debug!(
        "parsed navigation markup: <{}> with {} nodes",
        document.tag_name(document.root()).unwrap_or_default(),
        document.len()
    );
    Ok(document)
}

/// Writes the document back out as markup.
pub fn serialize(document: &Document) -> String {
    let mut out = String::new();
    if let Some(doctype) = document.doctype() {
        let _ = writeln!(out, "<!DOCTYPE {doctype}>");
    }
    write_node(document, document.root(), &mut out);
    out
}

fn write_node(document: &Document, id: NodeId, out: &mut String) {
    match document.data(id) {
        NodeData::Text(text) => {
            let raw = document
                .parent(id)
                .and_then(|parent| document.tag_name(parent))
                .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
            if raw {
                out.push_str(text);
            } else {
                out.push_str(&escape(text, false));
            }
        }
        NodeData::Element(element) => {
            let _ = write!(out, "<{}", element.tag_name);
            for (name, value) in &element.attributes {
                let _ = write!(out, " {name}=\"{}\"", escape(value, true));
            }
            if document.children(id).is_empty() && VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
                out.push_str(" />");
                return;
            }
            out.push('>');
            for child in document.children(id) {
                write_node(document, *child, out);
            }
            let _ = write!(out, "</{}>", element.tag_name);
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKUP: &str = r#"<nav>
  <!-- sidebar -->
  <details open="">
    <summary>Docs &amp; Guides</summary>
    <a href="/docs/guide.html" title="a &quot;guide&quot;">Guide</a>
    <br/>
  </details>
</nav>"#;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Docs &amp; more</title>
<script>if (a < b && c) { render(); }</script>
</head>
<body>
  <nav>
    <ul>
      <li><a href="/index.html">Home&nbsp;page</a>
      <li><details open><summary>Docs</summary><a href=/docs/setup.html>Setup</a></details>
    </ul>
  </nav>
</body>
</html>"#;

    fn first_by_tag(doc: &Document, tag: &str) -> NodeId {
        doc.descendants(doc.root())
            .into_iter()
            .find(|node| doc.tag_name(*node) == Some(tag))
            .unwrap()
    }

    #[test]
    fn parse_keeps_elements_attributes_and_text() {
        let doc = parse(MARKUP).unwrap();
        assert_eq!(doc.tag_name(doc.root()), Some("nav"));
        let details = doc.element_children(doc.root()).next().unwrap();
        assert_eq!(doc.tag_name(details), Some("details"));
        assert_eq!(doc.attribute(details, "open"), Some(""));
        let summary = doc.element_children(details).next().unwrap();
        assert_eq!(doc.text_content(summary), "Docs & Guides");
    }

    #[test]
    fn serialize_escapes_and_reparses() {
        let doc = parse(MARKUP).unwrap();
        let written = serialize(&doc);
        assert!(written.contains("Docs &amp; Guides"));
        assert!(written.contains(r#"title="a &quot;guide&quot;""#));
        assert!(written.contains("<br />"));
        assert!(!written.contains("sidebar"));

        let again = parse(&written).unwrap();
        assert_eq!(serialize(&again), written);
    }

    #[test]
    fn loads_a_rendered_html_page() {
        let doc = parse(PAGE).unwrap();
        assert_eq!(doc.doctype(), Some("html"));
        assert_eq!(doc.tag_name(doc.root()), Some("html"));

        let details = first_by_tag(&doc, "details");
        assert!(doc.has_attribute(details, "open"));

        // implied </li>: both items are children of the list
        let list = first_by_tag(&doc, "ul");
        assert_eq!(doc.element_children(list).count(), 2);

        let home = first_by_tag(&doc, "a");
        assert_eq!(doc.text_content(home), "Home\u{a0}page");
        let setup = doc.element_children(details).nth(1).unwrap();
        assert_eq!(doc.attribute(setup, "href"), Some("/docs/setup.html"));

        let script = first_by_tag(&doc, "script");
        assert_eq!(doc.text_content(script), "if (a < b && c) { render(); }");
    }

    #[test]
    fn rendered_page_round_trips() {
        let doc = parse(PAGE).unwrap();
        let written = serialize(&doc);
        assert!(written.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(written.contains("<script>if (a < b && c) { render(); }</script>"));
        assert!(written.contains("<meta charset=\"utf-8\" />"));
        assert_eq!(serialize(&parse(&written).unwrap()), written);
    }

    #[test]
    fn unclosed_elements_end_with_their_ancestors() {
        let doc = parse("<nav><details><summary>Docs</nav>").unwrap();
        let details = doc.element_children(doc.root()).next().unwrap();
        assert_eq!(doc.element_children(details).count(), 1);
        assert_eq!(serialize(&doc), "<nav><details><summary>Docs</summary></details></nav>");
    }

    #[test]
    fn markup_without_a_single_root_is_an_error() {
        let err = parse("<nav></nav><aside></aside>").unwrap_err();
        assert!(err.to_string().contains("more than one root element"));
        assert!(parse("  just text  ").is_err());
        assert!(parse("").is_err());
    }
}
