use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::document::{Document, NodeId};

// One simple-selector component: `.class` or `[attr]` / `[attr=value]`.
static COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:\.([\w-]+)|\[\s*([\w:-]+)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'|([^\]\s"']+))\s*)?\])"#)
        .expect("selector component pattern is valid")
});

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\*|[A-Za-z][\w-]*)").expect("tag pattern is valid"));

#[derive(Debug, Clone, PartialEq)]
enum AttrMatch {
    Present(String),
    Equals(String, String),
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrMatch>,
}

impl Compound {
    fn parse(text: &str) -> Result<Self> {
        let mut compound = Compound::default();
        let mut rest = text;

        if let Some(tag) = TAG.find(rest) {
            if tag.as_str() != "*" {
                compound.tag = Some(tag.as_str().to_ascii_lowercase());
            }
            rest = &rest[tag.end()..];
        }

        while !rest.is_empty() {
            let Some(caps) = COMPONENT.captures(rest) else {
                bail!("unsupported selector syntax near '{rest}'");
            };
            if let Some(class) = caps.get(1) {
                compound.classes.push(class.as_str().to_string());
            } else if let Some(name) = caps.get(2) {
                let value = caps.get(3).or(caps.get(4)).or(caps.get(5));
                compound.attributes.push(match value {
                    Some(value) => AttrMatch::Equals(name.as_str().to_string(), value.as_str().to_string()),
                    None => AttrMatch::Present(name.as_str().to_string()),
                });
            }
            let consumed = caps.get(0).map(|m| m.end()).unwrap_or(rest.len());
            rest = &rest[consumed..];
        }

        Ok(compound)
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag_name) = doc.tag_name(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| doc.has_class(node, class)) {
            return false;
        }
        self.attributes.iter().all(|attr| match attr {
            AttrMatch::Present(name) => doc.has_attribute(node, name),
            AttrMatch::Equals(name, value) => doc.attribute(node, name) == Some(value.as_str()),
        })
    }
}

/// The selector subset the navigation markup contract needs: compound
/// selectors (`tag`, `.class`, `[attr]`, `[attr=value]`) joined by
/// descendant combinators.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let compounds = split_compounds(source)
            .into_iter()
            .map(Compound::parse)
            .collect::<Result<Vec<_>>>()?;
        if compounds.is_empty() {
            bail!("empty selector");
        }
        Ok(Self {
            source: source.trim().to_string(),
            compounds,
        })
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(doc, node) {
            return false;
        }

        // Descendant combinators only, so a greedy right-to-left walk is exact.
        let mut pending = rest.iter().rev().peekable();
        for ancestor in doc.ancestors(node) {
            match pending.peek() {
                Some(compound) if compound.matches(doc, ancestor) => {
                    pending.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        pending.peek().is_none()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// Whitespace separates compounds except inside brackets or quotes.
fn split_compounds(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;

    for (i, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&source[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        parts.push(&source[s..]);
    }
    parts
}
