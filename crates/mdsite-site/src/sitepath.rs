//! Structured output-path value type.
//!
//! Every generated page and mirrored asset is identified by a [`SitePath`]:
//! a normalized, `/`-separated path relative to the output root (e.g.
//! `index.html`, `html/jvm/gc.html`). Depth and relative-reference
//! computation live here, once, instead of being re-derived at call sites.

use std::fmt;

/// A normalized path relative to the output root.
///
/// Invariants: non-empty, `/`-separated, no leading slash, last segment is a
/// file name. Segments are opaque - whatever the source tree used is kept
/// verbatim.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SitePath(String);

impl SitePath {
    /// Create a site path from a pre-normalized string.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Build a site path from individual segments, skipping empty ones.
    #[must_use]
    pub fn from_segments<'a, I>(segments: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let joined: Vec<&str> = segments.into_iter().filter(|s| !s.is_empty()).collect();
        Self(joined.join("/"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments, final file name included.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Final segment (the file name).
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// File name without its extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        name.rsplit_once('.').map_or(name, |(stem, _)| stem)
    }

    /// Directory portion of the path, empty for a root-level page.
    #[must_use]
    pub fn dir(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(dir, _)| dir)
    }

    /// Number of directory levels between the output root and this page.
    ///
    /// Derived purely from the path structure: `index.html` is 0,
    /// `html/setup.html` is 1, `html/jvm/gc.html` is 2.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.matches('/').count()
    }

    /// Compute the minimal relative reference to `self` from `current`.
    ///
    /// Both paths are treated as file paths; the base directory is everything
    /// before `current`'s final segment. The shared directory prefix is
    /// elided, one `..` is emitted per remaining ancestor of the base, then
    /// the remaining target segments follow. An index page in `current`'s own
    /// directory collapses to `./`.
    #[must_use]
    pub fn relative_from(&self, current: &SitePath) -> String {
        let to: Vec<&str> = self.segments().collect();
        let from: Vec<&str> = current.segments().collect();
        let from_dir = &from[..from.len() - 1];

        let common = from_dir
            .iter()
            .zip(&to)
            .take_while(|(a, b)| a == b)
            .count();

        let ups = from_dir.len() - common;
        let remaining = &to[common..];

        if ups == 0 && remaining == ["index.html"] {
            return "./".to_owned();
        }

        let mut result = "../".repeat(ups);
        result.push_str(&remaining.join("/"));
        result
    }
}

impl fmt::Display for SitePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
