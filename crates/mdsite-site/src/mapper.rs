//! Source document path to output path mapping.
//!
//! The index-file convention: a `README.md` is the index document of its
//! directory and maps to that directory's `index.html`, one level up in
//! effective depth. Every other document maps to a sibling `.html` page
//! mirroring its source nesting under the generated subtree.

use std::path::Path;

use crate::sitepath::SitePath;

/// The designated index document of a directory.
pub const INDEX_DOC: &str = "README.md";

/// File name of a generated directory index page.
pub const INDEX_PAGE: &str = "index.html";

/// Reserved page template file name. Never treated as a document and
/// preserved across rebuilds.
pub const TEMPLATE_FILE: &str = "template.html";

/// Subtree of the output root holding all generated pages except the root
/// index, mirroring the source directory nesting.
pub const GENERATED_SUBDIR: &str = "html";

/// Map a source-root-relative document path to its output path.
///
/// A pure function of the path and the fixed convention:
///
/// - `README.md` -> `index.html`
/// - `jvm/README.md` -> `html/jvm/index.html`
/// - `jvm/gc.md` -> `html/jvm/gc.html`
/// - `setup.md` -> `html/setup.html`
///
/// Path segments are used verbatim - callers must treat them as opaque.
#[must_use]
pub fn map_document(source_rel: &Path) -> SitePath {
    let rel = to_slash(source_rel);

    if rel == INDEX_DOC {
        return SitePath::new(INDEX_PAGE);
    }

    let (dir, file) = rel.rsplit_once('/').unwrap_or(("", rel.as_str()));

    if file == INDEX_DOC {
        return SitePath::from_segments([GENERATED_SUBDIR, dir, INDEX_PAGE]);
    }

    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    let page = format!("{stem}.html");
    SitePath::from_segments([GENERATED_SUBDIR, dir, page.as_str()])
}

/// Map a source-root-relative asset path into the mirrored generated subtree.
///
/// `jvm/diagrams/heap.png` -> `html/jvm/diagrams/heap.png`.
#[must_use]
pub fn map_asset(source_rel: &Path) -> SitePath {
    let rel = to_slash(source_rel);
    SitePath::from_segments([GENERATED_SUBDIR, rel.as_str()])
}

/// Derive a navigation label from a file stem: word separators become
/// spaces, words are title-cased.
#[must_use]
pub fn display_name(stem: &str) -> String {
    title_case(&stem.replace(['_', '-'], " "))
}

/// Derive the page title for an output path.
///
/// Non-index pages use the display name of their stem. A directory index
/// page takes its parent directory's name verbatim; the root index page gets
/// the fixed home label.
#[must_use]
pub fn page_title(path: &SitePath) -> String {
    if path.stem() == "index" {
        let parent = path.dir().rsplit('/').next().unwrap_or("");
        if parent.is_empty() {
            "Home".to_owned()
        } else {
            parent.to_owned()
        }
    } else {
        display_name(path.stem())
    }
}

/// Join path components with forward slashes regardless of platform.
fn to_slash(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

/// Uppercase the first letter of every word, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            result.push(c);
            prev_alpha = false;
        }
    }
    result
}
