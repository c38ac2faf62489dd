//! Markdown to HTML conversion.
//!
//! [`convert`] is the single entry point: it normalizes list indentation
//! (authors write 2-space nesting, the parser wants 4), then renders the
//! document through a pulldown-cmark event loop producing heading anchors,
//! alignment-aware tables, fenced code blocks, and line-break-preserving
//! paragraphs.
//!
//! Each call builds a fresh parser and renderer, so no state (heading-ID
//! deduplication included) leaks between documents.

mod html;
mod normalize;

use pulldown_cmark::{Options, Parser};

pub use html::{HtmlRenderer, escape_html};
pub use normalize::normalize_list_indentation;

/// Convert raw Markdown text to an HTML fragment.
#[must_use]
pub fn convert(markdown: &str) -> String {
    let normalized = normalize_list_indentation(markdown);
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(&normalized, options);
    HtmlRenderer::new().render(parser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn convert_paragraph() {
        assert_eq!(convert("Hello, world!"), "<p>Hello, world!</p>");
    }

    #[test]
    fn convert_normalizes_two_space_nesting() {
        let markdown = "- outer\n  - inner";
        let html = convert(markdown);
        // The nested item only renders as a nested list after normalization.
        assert_eq!(html.matches("<ul>").count(), 2);
    }

    #[test]
    fn convert_resets_heading_ids_between_documents() {
        let first = convert("## FAQ");
        let second = convert("## FAQ");
        assert_eq!(first, second);
        assert!(first.contains(r##"id="faq""##));
    }
}
