use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::nav::{ReconcileMode, SegmentSemantics};

/// Tool configuration, read from TOML. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    pub mode: ReconcileMode,
    /// URL the navigation markup is served from; hrefs and locations resolve against it
    pub base_url: String,
    /// Suffixes stripped from path segments before lookup
    pub extensions: Vec<String>,
    /// Set `aria-current="page"` on the link matching the location
    pub mark_current: bool,
    pub segment_semantics: SegmentSemantics,
    pub markup: MarkupConfig,
}

/// Markup contract: how tree links, toggles and containers are recognized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkupConfig {
    pub nav_root: String,
    pub link_selector: String,
    pub collapsible_selector: String,
    pub toggle_class: String,
    pub nested_class: String,
    pub active_class: String,
    pub caret_down_class: String,
    pub current_attribute: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            mode: ReconcileMode::ForceOpen,
            base_url: "http://localhost/".to_string(),
            extensions: vec!["html".to_string(), "htm".to_string()],
            mark_current: true,
            segment_semantics: SegmentSemantics::Toggle,
            markup: MarkupConfig::default(),
        }
    }
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            nav_root: "nav".to_string(),
            link_selector: "nav a".to_string(),
            collapsible_selector: "details".to_string(),
            toggle_class: "caret".to_string(),
            nested_class: "nested".to_string(),
            active_class: "active".to_string(),
            caret_down_class: "caret-down".to_string(),
            current_attribute: "aria-current".to_string(),
        }
    }
}

impl NavConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: NavConfig =
            toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Reads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
mode = "segment-toggle"
extensions = ["php"]

[markup]
toggle_class = "arrow"
"#
        )
        .unwrap();

        let config = NavConfig::load(file.path()).unwrap();
        assert_eq!(config.mode, ReconcileMode::SegmentToggle);
        assert_eq!(config.extensions, ["php"]);
        assert_eq!(config.markup.toggle_class, "arrow");
        assert_eq!(config.markup.nested_class, "nested");
        assert_eq!(config.segment_semantics, SegmentSemantics::Toggle);
        assert!(config.mark_current);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "colour = \"blue\"").unwrap();
        let err = NavConfig::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config file"));
    }

    #[test]
    fn missing_file_is_an_error_only_when_named() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("navtree.toml");
        assert!(NavConfig::load_or_default(Some(&missing)).is_err());
        assert_eq!(
            NavConfig::load_or_default(None).unwrap().markup.link_selector,
            "nav a"
        );
    }
}
