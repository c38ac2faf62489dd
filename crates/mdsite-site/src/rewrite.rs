//! Link and image rewriting for converted HTML fragments.
//!
//! A converted fragment still carries the source tree's relative references:
//! `[GC](gc.md)` points at a Markdown file, `![heap](diagrams/heap.png)` at
//! a file next to the document. [`rewrite_fragment`] resolves both against
//! the originating document's source directory and re-targets them so they
//! stay valid from the fragment's output location.
//!
//! The scanner only touches `href` attributes of `<a>` tags and `src`
//! attributes of `<img>` tags, the full link vocabulary the renderer emits;
//! raw HTML islands using other tags pass through untouched.

use std::path::{Component, Path, PathBuf};

use crate::mapper::{map_asset, map_document};
use crate::nav::PathMapping;
use crate::sitepath::SitePath;

/// Read-only inputs for rewriting one fragment.
pub struct RewriteContext<'a> {
    /// Output path of the fragment being rewritten.
    pub current: &'a SitePath,
    /// Absolute path of the originating source document.
    pub source_doc: &'a Path,
    /// Absolute source root.
    pub source_root: &'a Path,
    /// Document mapping from the discovery pass.
    pub mapping: &'a PathMapping,
}

/// Rewrite every local anchor target and image source in `html` to a path
/// relative to the fragment's output location.
///
/// Rewriting with an unchanged mapping is idempotent: resolved links no
/// longer look like Markdown targets, and image targets re-resolve to
/// themselves through the mirrored output tree.
#[must_use]
pub fn rewrite_fragment(html: &str, ctx: &RewriteContext<'_>) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find('<') {
        let (before, tag_start) = rest.split_at(pos);
        out.push_str(before);

        let Some(end) = tag_start.find('>') else {
            out.push_str(tag_start);
            return out;
        };
        let tag = &tag_start[..=end];

        if let Some(rewritten) = rewrite_tag(tag, ctx) {
            out.push_str(&rewritten);
        } else {
            out.push_str(tag);
        }
        rest = &tag_start[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Rewrite the relevant attribute of a single tag, if any.
fn rewrite_tag(tag: &str, ctx: &RewriteContext<'_>) -> Option<String> {
    let attr = if tag.starts_with("<a ") || tag.starts_with("<a\t") {
        "href"
    } else if tag.starts_with("<img ") || tag.starts_with("<img\t") {
        "src"
    } else {
        return None;
    };

    let marker = format!("{attr}=\"");
    let value_start = tag.find(&marker)? + marker.len();
    let value_len = tag[value_start..].find('"')?;
    let value = &tag[value_start..value_start + value_len];

    let target = unescape_attr(value);
    let resolved = match attr {
        "href" => rewrite_link(&target, ctx)?,
        _ => rewrite_image(&target, ctx)?,
    };

    let mut rewritten = String::with_capacity(tag.len());
    rewritten.push_str(&tag[..value_start]);
    rewritten.push_str(&escape_attr(&resolved));
    rewritten.push_str(&tag[value_start + value_len..]);
    Some(rewritten)
}

/// Resolve a hyperlink target. Returns `None` when the target must be left
/// untouched.
fn rewrite_link(target: &str, ctx: &RewriteContext<'_>) -> Option<String> {
    if target.is_empty() || target.starts_with('#') || is_external(target) {
        return None;
    }

    let (path_part, anchor) = match target.split_once('#') {
        Some((path, anchor)) => (path, Some(anchor)),
        None => (target, None),
    };
    if path_part.is_empty() || path_part == "." || !path_part.ends_with(".md") {
        return None;
    }

    let source_dir = ctx.source_doc.parent()?;
    let resolved = normalize_lexically(&source_dir.join(path_part));
    let rel = resolved.strip_prefix(ctx.source_root).ok()?;

    let output = match ctx.mapping.lookup(&slash_path(rel)) {
        Some(mapped) => mapped.clone(),
        // Reachable by explicit link but outside the publish scope: compute
        // the would-be location and leave the reference dangling.
        None if resolved.is_file() => map_document(rel),
        None => return None,
    };

    let mut reference = output.relative_from(ctx.current);
    if let Some(anchor) = anchor {
        reference.push('#');
        reference.push_str(anchor);
    }
    Some(reference)
}

/// Resolve an image source. Returns `None` when the source must be left
/// untouched.
fn rewrite_image(target: &str, ctx: &RewriteContext<'_>) -> Option<String> {
    if target.is_empty() || is_external(target) {
        return None;
    }

    let source_dir = ctx.source_doc.parent()?;
    let resolved = normalize_lexically(&source_dir.join(target));
    let rel = resolved.strip_prefix(ctx.source_root).ok()?;

    Some(map_asset(rel).relative_from(ctx.current))
}

fn is_external(target: &str) -> bool {
    target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("//")
        || target.starts_with("mailto:")
        || target.starts_with("tel:")
}

/// Normalize `.` and `..` components without touching the filesystem.
/// `..` above the first component is kept so out-of-root targets fail the
/// later `strip_prefix` check instead of silently clamping.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push("..");
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

fn slash_path(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn escape_attr(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::scan;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    struct Fixture {
        tmp: TempDir,
        mapping: PathMapping,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let root = tmp.path();
            write(root, "README.md", "# Welcome");
            write(root, "jvm/README.md", "# JVM");
            write(root, "jvm/gc.md", "# GC");
            write(root, "jvm/memory/heap.md", "# Heap");
            write(root, "jvm/diagrams/heap.png", "png");
            write(root, "spring/boot.md", "# Boot");
            let mapping = scan(root, &[]).unwrap().mapping;
            Self { tmp, mapping }
        }

        fn rewrite(&self, html: &str, current: &str, source_doc: &str) -> String {
            let current = SitePath::new(current);
            let source_doc = self.tmp.path().join(source_doc);
            let ctx = RewriteContext {
                current: &current,
                source_doc: &source_doc,
                source_root: self.tmp.path(),
                mapping: &self.mapping,
            };
            rewrite_fragment(html, &ctx)
        }
    }

    #[test]
    fn sibling_document_link() {
        let fx = Fixture::new();
        let html = fx.rewrite(
            r#"<p><a href="gc.md">GC</a></p>"#,
            "html/jvm/index.html",
            "jvm/README.md",
        );
        assert_eq!(html, r#"<p><a href="gc.html">GC</a></p>"#);
    }

    #[test]
    fn index_document_link_collapses() {
        let fx = Fixture::new();
        let html = fx.rewrite(
            r#"<a href="README.md">up</a>"#,
            "html/jvm/gc.html",
            "jvm/gc.md",
        );
        assert_eq!(html, r#"<a href="./">up</a>"#);
    }

    #[test]
    fn cross_directory_link() {
        let fx = Fixture::new();
        let html = fx.rewrite(
            r#"<a href="../spring/boot.md">Boot</a>"#,
            "html/jvm/gc.html",
            "jvm/gc.md",
        );
        assert_eq!(html, r#"<a href="../spring/boot.html">Boot</a>"#);
    }

    #[test]
    fn link_from_root_index() {
        let fx = Fixture::new();
        let html = fx.rewrite(
            r#"<a href="jvm/README.md">JVM</a>"#,
            "index.html",
            "README.md",
        );
        assert_eq!(html, r#"<a href="html/jvm/index.html">JVM</a>"#);
    }

    #[test]
    fn anchor_suffix_survives() {
        let fx = Fixture::new();
        let html = fx.rewrite(
            r#"<a href="gc.md#generations">gen</a>"#,
            "html/jvm/index.html",
            "jvm/README.md",
        );
        assert_eq!(html, r#"<a href="gc.html#generations">gen</a>"#);
    }

    #[test]
    fn external_and_fragment_targets_untouched() {
        let fx = Fixture::new();
        let html = r##"<a href="https://example.com/x.md">x</a><a href="#local">l</a><a href="mailto:a@b.c">m</a>"##;
        assert_eq!(fx.rewrite(html, "html/jvm/gc.html", "jvm/gc.md"), html);
    }

    #[test]
    fn non_markdown_target_untouched() {
        let fx = Fixture::new();
        let html = r#"<a href="notes.txt">notes</a>"#;
        assert_eq!(fx.rewrite(html, "html/jvm/gc.html", "jvm/gc.md"), html);
    }

    #[test]
    fn unresolvable_target_untouched() {
        let fx = Fixture::new();
        let html = r#"<a href="missing.md">gone</a>"#;
        assert_eq!(fx.rewrite(html, "html/jvm/gc.html", "jvm/gc.md"), html);
    }

    #[test]
    fn out_of_scope_target_resolves_through_mapper() {
        // Partial publish: spring/ is not scanned, but the document exists
        // on disk and stays reachable as a dangling reference.
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "jvm/README.md", "# JVM");
        write(root, "jvm/gc.md", "# GC");
        write(root, "spring/boot.md", "# Boot");
        let mapping = scan(root, &["jvm".to_owned()]).unwrap().mapping;

        let current = SitePath::new("html/jvm/gc.html");
        let source_doc = root.join("jvm/gc.md");
        let ctx = RewriteContext {
            current: &current,
            source_doc: &source_doc,
            source_root: root,
            mapping: &mapping,
        };
        let html = rewrite_fragment(r#"<a href="../spring/boot.md">Boot</a>"#, &ctx);
        assert_eq!(html, r#"<a href="../spring/boot.html">Boot</a>"#);
    }

    #[test]
    fn target_outside_source_root_untouched() {
        let fx = Fixture::new();
        let html = r#"<a href="../../elsewhere/doc.md">out</a>"#;
        assert_eq!(fx.rewrite(html, "html/jvm/gc.html", "jvm/gc.md"), html);
    }

    #[test]
    fn image_in_same_directory() {
        let fx = Fixture::new();
        let html = fx.rewrite(
            r#"<img src="diagrams/heap.png" alt="heap">"#,
            "html/jvm/gc.html",
            "jvm/gc.md",
        );
        assert_eq!(html, r#"<img src="diagrams/heap.png" alt="heap">"#);
    }

    #[test]
    fn image_reference_across_depth_change() {
        let fx = Fixture::new();
        let html = fx.rewrite(
            r#"<img src="../diagrams/heap.png" alt="heap">"#,
            "html/jvm/memory/heap.html",
            "jvm/memory/heap.md",
        );
        assert_eq!(html, r#"<img src="../diagrams/heap.png" alt="heap">"#);
    }

    #[test]
    fn image_from_root_index() {
        let fx = Fixture::new();
        let html = fx.rewrite(
            r#"<img src="jvm/diagrams/heap.png" alt="heap">"#,
            "index.html",
            "README.md",
        );
        assert_eq!(html, r#"<img src="html/jvm/diagrams/heap.png" alt="heap">"#);
    }

    #[test]
    fn external_image_untouched() {
        let fx = Fixture::new();
        let html = r#"<img src="https://example.com/logo.png" alt="logo">"#;
        assert_eq!(fx.rewrite(html, "html/jvm/gc.html", "jvm/gc.md"), html);
    }

    #[test]
    fn image_outside_source_root_untouched() {
        let fx = Fixture::new();
        let html = r#"<img src="../../../shared/logo.png" alt="logo">"#;
        assert_eq!(fx.rewrite(html, "html/jvm/gc.html", "jvm/gc.md"), html);
    }

    #[test]
    fn rewrite_is_idempotent() {
        let fx = Fixture::new();
        let html = r#"<p><a href="gc.md">GC</a> and <a href="memory/heap.md#top">heap</a>
<img src="diagrams/heap.png" alt="heap"></p>"#;
        let once = fx.rewrite(html, "html/jvm/index.html", "jvm/README.md");
        let twice = fx.rewrite(&once, "html/jvm/index.html", "jvm/README.md");
        assert_eq!(once, twice);
    }

    #[test]
    fn other_tags_untouched() {
        let fx = Fixture::new();
        let html = r#"<script src="evil.md"></script><link href="style.md">"#;
        assert_eq!(fx.rewrite(html, "html/jvm/gc.html", "jvm/gc.md"), html);
    }

    #[test]
    fn escaped_attribute_round_trips() {
        let fx = Fixture::new();
        // Unrewritable target with an entity stays byte-identical.
        let html = r#"<a href="https://example.com/?a=1&amp;b=2">q</a>"#;
        assert_eq!(fx.rewrite(html, "html/jvm/gc.html", "jvm/gc.md"), html);
    }
}
