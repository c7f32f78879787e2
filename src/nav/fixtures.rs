use super::contract::TreeContract;
use crate::config::NavConfig;
use crate::dom::{self, Document};

pub const DETAILS_PAGE: &str = r#"<nav>
  <ul>
    <li><a href="/index.html">Home</a></li>
    <li>
      <details>
        <summary>Docs</summary>
        <ul>
          <li><a href="/docs/">Overview</a></li>
          <li>
            <div class="group">
              <details>
                <summary>Guide</summary>
                <ul>
                  <li><a href="/docs/guide/setup.html">Setup</a></li>
                  <li>
                    <details>
                      <summary>Advanced</summary>
                      <a href="/docs/guide/advanced/tuning.html">Tuning</a>
                    </details>
                  </li>
                </ul>
              </details>
            </div>
          </li>
        </ul>
      </details>
    </li>
    <li><a href="https://example.com/elsewhere.html">Elsewhere</a></li>
  </ul>
</nav>"#;

pub const CARET_PAGE: &str = r#"<nav>
  <ul class="tree">
    <li><span class="caret">docs</span>
      <ul class="nested">
        <li><span class="caret">guide</span>
          <ul class="nested">
            <li><a href="/docs/guide/intro.html">Intro</a></li>
          </ul>
        </li>
      </ul>
    </li>
    <li><span class="caret">blog</span>
      <ul class="nested">
        <li><a href="/blog/hello.html">Hello</a></li>
      </ul>
    </li>
  </ul>
</nav>"#;

pub fn contract() -> TreeContract {
    TreeContract::from_config(&NavConfig::default()).unwrap()
}

pub fn details_page() -> (Document, TreeContract) {
    (dom::parse(DETAILS_PAGE).unwrap(), contract())
}

pub fn caret_page() -> (Document, TreeContract) {
    (dom::parse(CARET_PAGE).unwrap(), contract())
}

/// Element whose text is exactly `text`, searching the whole document.
pub fn find_by_text(doc: &Document, text: &str) -> dom::NodeId {
    doc.descendants(doc.root())
        .into_iter()
        .find(|node| doc.text_content(*node).trim() == text && doc.element_children(*node).next().is_none())
        .unwrap_or_else(|| panic!("no element with text {text:?}"))
}
