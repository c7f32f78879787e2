use anyhow::{bail, Context, Result};
use url::Url;

use super::path_key::{PathKey, PathNormalizer};
use super::reconcile::{ReconcileMode, SegmentSemantics};
use crate::config::NavConfig;
use crate::dom::Selector;

/// Compiled form of [`NavConfig`]: parsed selectors, base URL and path
/// normalizer, ready for the reconciliation routines.
#[derive(Debug, Clone)]
pub struct TreeContract {
    pub mode: ReconcileMode,
    pub segment_semantics: SegmentSemantics,
    pub mark_current: bool,
    pub base_url: Url,
    pub nav_root: Selector,
    pub links: Selector,
    pub collapsible: Selector,
    pub current_link: Selector,
    pub toggles: Selector,
    pub nested: Selector,
    pub active_class: String,
    pub caret_down_class: String,
    pub current_attribute: String,
    pub paths: PathNormalizer,
}

impl TreeContract {
    pub fn from_config(config: &NavConfig) -> Result<Self> {
        let markup = &config.markup;
        for (field, class) in [
            ("toggle_class", &markup.toggle_class),
            ("nested_class", &markup.nested_class),
            ("active_class", &markup.active_class),
            ("caret_down_class", &markup.caret_down_class),
        ] {
            if class.is_empty() || class.contains(char::is_whitespace) {
                bail!("markup.{field} must be a single class name, got {class:?}");
            }
        }

        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("invalid base_url {:?}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("base_url {:?} cannot resolve relative links", config.base_url);
        }

        Ok(Self {
            mode: config.mode,
            segment_semantics: config.segment_semantics,
            mark_current: config.mark_current,
            base_url,
            nav_root: selector("markup.nav_root", &markup.nav_root)?,
            links: selector("markup.link_selector", &markup.link_selector)?,
            collapsible: selector("markup.collapsible_selector", &markup.collapsible_selector)?,
            current_link: selector(
                "markup.nav_root",
                &format!("{} a[{}=page]", markup.nav_root, markup.current_attribute),
            )?,
            toggles: selector("markup.toggle_class", &format!(".{}", markup.toggle_class))?,
            nested: selector("markup.nested_class", &format!(".{}", markup.nested_class))?,
            active_class: markup.active_class.clone(),
            caret_down_class: markup.caret_down_class.clone(),
            current_attribute: markup.current_attribute.clone(),
            paths: PathNormalizer::new(&config.extensions)?,
        })
    }

    /// Key of the page at `location`: a path or an absolute URL. Query and
    /// fragment are ignored.
    pub fn location_key(&self, location: &str) -> PathKey {
        match self.base_url.join(location.trim()) {
            Ok(url) => self.paths.normalize(url.path()),
            Err(e) => {
                log::debug!("location {location:?} is not a URL ({e}), using it as a raw path");
                let raw = location.split(['?', '#']).next().unwrap_or_default();
                self.paths.normalize(raw)
            }
        }
    }

    /// Key of a tree link's destination, or `None` when the href leaves the
    /// site (other origin, non-http scheme) or does not parse.
    pub fn link_key(&self, href: &str) -> Option<PathKey> {
        let url = match self.base_url.join(href.trim()) {
            Ok(url) => url,
            Err(e) => {
                log::debug!("skipping unparsable href {href:?}: {e}");
                return None;
            }
        };
        if !matches!(url.scheme(), "http" | "https") || url.origin() != self.base_url.origin() {
            log::trace!("skipping off-site href {href:?}");
            return None;
        }
        Some(self.paths.normalize(url.path()))
    }
}

fn selector(field: &str, source: &str) -> Result<Selector> {
    Selector::parse(source).with_context(|| format!("invalid {field} {source:?}"))
}
