use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::fmt;

/// Normalized identifier of a page inside the navigation tree: the decoded,
/// non-empty path segments with any known extension stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathKey {
    segments: Vec<String>,
}

impl PathKey {
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Lookup key: segments joined with `/`, no leading or trailing slash.
    pub fn as_key(&self) -> String {
        self.segments.join("/")
    }

    /// Every leading sub-path, shortest first: `a`, `a/b`, `a/b/c`.
    pub fn prefixes(&self) -> impl Iterator<Item = PathKey> + '_ {
        (1..=self.segments.len()).map(|len| PathKey {
            segments: self.segments[..len].to_vec(),
        })
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.as_key())
    }
}

/// Turns raw URL paths into [`PathKey`]s.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    extension: Option<Regex>,
}

impl PathNormalizer {
    pub fn new(extensions: &[String]) -> Result<Self> {
        let alternatives: Vec<String> = extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(regex::escape)
            .collect();

        let extension = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\.(?:{})$", alternatives.join("|"));
            Some(Regex::new(&pattern).with_context(|| format!("invalid extension list {extensions:?}"))?)
        };

        Ok(Self { extension })
    }

    pub fn normalize(&self, path: &str) -> PathKey {
        let decoded = percent_decode_str(path).decode_utf8_lossy();
        let segments = decoded
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| self.strip_extension(segment))
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        PathKey { segments }
    }

    fn strip_extension<'a>(&self, segment: &'a str) -> &'a str {
        match self.extension.as_ref().and_then(|re| re.find(segment)) {
            Some(found) => &segment[..found.start()],
            None => segment,
        }
    }
}
