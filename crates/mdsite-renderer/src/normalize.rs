//! List-indentation normalization.
//!
//! Authors commonly indent nested list items by 2 spaces per level; the
//! Markdown parser needs 4 to recognize nesting. Every 2-space level is
//! widened to a 4-space level: 2 -> 4, 4 -> 8, 6 -> 12. Odd space counts
//! are ambiguous and pass through unmodified, as does everything inside
//! fenced code blocks and 4-space-indented code lines.

/// Normalize bullet-list indentation from 2-space to 4-space nesting.
#[must_use]
pub fn normalize_list_indentation(markdown: &str) -> String {
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for line in markdown.split('\n') {
        let stripped = line.trim_start();

        // Fence markers toggle code-block state and pass through.
        if stripped.starts_with("```") {
            in_code_block = !in_code_block;
            lines.push(line.to_owned());
            continue;
        }
        if in_code_block {
            lines.push(line.to_owned());
            continue;
        }

        // 4-space-indented code lines keep their indentation, unless the
        // content is itself a list item (deeply nested lists).
        if line.starts_with("    ") && !is_list_content(stripped) {
            lines.push(line.to_owned());
            continue;
        }

        match split_list_item(line) {
            Some((spaces, marker, content)) if spaces % 2 == 0 => {
                let mut normalized = "    ".repeat(spaces / 2);
                normalized.push(marker);
                normalized.push(' ');
                normalized.push_str(content);
                lines.push(normalized);
            }
            _ => lines.push(line.to_owned()),
        }
    }

    lines.join("\n")
}

fn is_list_content(stripped: &str) -> bool {
    stripped.starts_with("- ") || stripped.starts_with("* ") || stripped.starts_with("+ ")
}

/// Split `<spaces><marker><whitespace><content>` into its parts. Returns
/// `None` when the line is not a bullet item or the indent contains tabs.
fn split_list_item(line: &str) -> Option<(usize, char, &str)> {
    let spaces = line.len() - line.trim_start_matches(' ').len();
    let rest = &line[spaces..];
    let mut chars = rest.chars();
    let marker = chars.next()?;
    if !matches!(marker, '-' | '*' | '+') {
        return None;
    }
    let after = chars.as_str();
    let content = after.trim_start_matches([' ', '\t']);
    if content.len() == after.len() {
        // No whitespace after the marker: "-foo" is not a list item.
        return None;
    }
    Some((spaces, marker, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn two_spaces_become_four() {
        assert_eq!(normalize_list_indentation("  - item"), "    - item");
    }

    #[test]
    fn four_spaces_become_eight() {
        assert_eq!(normalize_list_indentation("    - item"), "        - item");
    }

    #[test]
    fn six_spaces_become_twelve() {
        assert_eq!(normalize_list_indentation("      - item"), "            - item");
    }

    #[test]
    fn zero_spaces_unchanged() {
        assert_eq!(normalize_list_indentation("- item"), "- item");
    }

    #[test]
    fn odd_indent_passes_through() {
        assert_eq!(normalize_list_indentation("   - item"), "   - item");
        assert_eq!(normalize_list_indentation(" - item"), " - item");
    }

    #[test]
    fn all_markers_recognized() {
        assert_eq!(normalize_list_indentation("  * item"), "    * item");
        assert_eq!(normalize_list_indentation("  + item"), "    + item");
    }

    #[test]
    fn fenced_code_never_modified() {
        let input = "```\n  - not a list\n```";
        assert_eq!(normalize_list_indentation(input), input);
    }

    #[test]
    fn fence_state_persists_across_lines() {
        let input = "```text\n  - one\n  - two\n```\n  - real";
        let expected = "```text\n  - one\n  - two\n```\n    - real";
        assert_eq!(normalize_list_indentation(input), expected);
    }

    #[test]
    fn indented_code_block_unchanged() {
        assert_eq!(normalize_list_indentation("    let x = 1;"), "    let x = 1;");
    }

    #[test]
    fn non_list_lines_unchanged() {
        assert_eq!(normalize_list_indentation("  plain text"), "  plain text");
        assert_eq!(normalize_list_indentation("-not a list"), "-not a list");
    }

    #[test]
    fn tab_indent_passes_through() {
        assert_eq!(normalize_list_indentation("\t- item"), "\t- item");
    }

    #[test]
    fn multi_line_document() {
        let input = "# Title\n\n- top\n  - nested\n    - deeper\n\ndone";
        let expected = "# Title\n\n- top\n    - nested\n        - deeper\n\ndone";
        assert_eq!(normalize_list_indentation(input), expected);
    }

    #[test]
    fn trailing_newline_preserved() {
        assert_eq!(normalize_list_indentation("- item\n"), "- item\n");
    }
}
