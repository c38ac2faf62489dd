//! HTML renderer for pulldown-cmark events.
//!
//! Produces semantic HTML5 with anchor IDs on headings.
//!
//! # Architecture
//!
//! The renderer uses a state machine pattern to track context during event
//! processing:
//! - `CodeBlockState`: Tracks code block language and content buffering
//! - `TableState`: Tracks table headers, cell alignments, and current cell index
//! - `ImageState`: Captures alt text while inside image tags
//! - `HeadingState`: Buffers heading text/markup and deduplicates anchor IDs
//!
//! Soft line breaks render as `<br>` so single newlines inside a paragraph
//! survive into the page, matching how the source documents are written.

use std::collections::HashMap;
use std::fmt::Write;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Tag, TagEnd};

/// State for tracking code block rendering.
#[derive(Default)]
struct CodeBlockState {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }
}

/// State for tracking table rendering.
#[derive(Default)]
struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    fn current_alignment(&self) -> Option<&Alignment> {
        self.alignments.get(self.cell_index)
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
struct ImageState {
    active: bool,
    alt_text: String,
}

impl ImageState {
    fn start(&mut self) {
        self.active = true;
        self.alt_text.clear();
    }

    fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.alt_text)
    }
}

/// State for heading buffering and anchor ID generation.
#[derive(Default)]
struct HeadingState {
    /// Current heading level (None when not inside a heading).
    current_level: Option<u8>,
    /// Plain text buffer, used for the slug.
    text: String,
    /// HTML buffer with inline formatting.
    html: String,
    /// Per-document counters for deduplicating anchor IDs.
    id_counts: HashMap<String, usize>,
}

impl HeadingState {
    fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Complete the heading, returning `(level, id, html)`.
    fn complete_heading(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        let id = self.generate_id(&text);
        Some((level, id, html))
    }

    fn generate_id(&mut self, text: &str) -> String {
        let base_id = slugify(text);
        let count = self.id_counts.entry(base_id.clone()).or_insert(0);
        *count += 1;

        if *count == 1 {
            base_id
        } else {
            format!("{base_id}-{}", *count - 1)
        }
    }
}

/// Renders pulldown-cmark events to semantic HTML5.
pub struct HtmlRenderer {
    output: String,
    /// Stack of nested list types (true = ordered, false = unordered).
    list_stack: Vec<bool>,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
}

impl HtmlRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            list_stack: Vec::new(),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
        }
    }

    /// Render markdown events and return the HTML fragment.
    #[must_use]
    pub fn render<'a, I>(mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        self.output
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.hard_break(),
            Event::Rule => self.horizontal_rule(),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Intentionally not supported.
            }
        }
    }

    /// Push inline markup into the heading buffer or the main output.
    fn push_inline(&mut self, markup: &str) {
        if self.heading.is_active() {
            self.heading.html.push_str(markup);
        } else {
            self.output.push_str(markup);
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.code.active {
                    self.output.push_str("<p>");
                }
            }
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the ID is known.
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => {
                self.output.push_str("<blockquote>");
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                        Some(lang.split_whitespace().next().unwrap_or("").to_owned())
                    }
                    _ => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => {
                self.list_stack.push(start.is_some());
                match start {
                    Some(1) => self.output.push_str("<ol>"),
                    Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                    None => self.output.push_str("<ul>"),
                }
            }
            Tag::Item => {
                self.output.push_str("<li>");
            }
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => {
                self.output.push_str("<dl>");
            }
            Tag::DefinitionListTitle => {
                self.output.push_str("<dt>");
            }
            Tag::DefinitionListDefinition => {
                self.output.push_str("<dd>");
            }
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.cell_index = 0;
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.cell_index = 0;
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align_style = self
                    .table
                    .current_alignment()
                    .and_then(|a| match a {
                        Alignment::Left => Some(" style=\"text-align:left\""),
                        Alignment::Center => Some(" style=\"text-align:center\""),
                        Alignment::Right => Some(" style=\"text-align:right\""),
                        Alignment::None => None,
                    })
                    .unwrap_or("");

                if self.table.in_head {
                    write!(self.output, "<th{align_style}>").unwrap();
                } else {
                    write!(self.output, "<td{align_style}>").unwrap();
                }
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Link { dest_url, .. } => {
                let link = format!(r#"<a href="{}">"#, escape_html(&dest_url));
                self.push_inline(&link);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Start collecting alt text; the tag is closed in end_tag.
                self.image.start();
                write!(self.output, r#"<img src="{}""#, escape_html(&dest_url)).unwrap();
                if !title.is_empty() {
                    write!(self.output, r#" title="{}""#, escape_html(&title)).unwrap();
                }
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if !self.code.active {
                    self.output.push_str("</p>");
                }
            }
            TagEnd::Heading(level) => {
                if let Some((heading_level, id, html)) = self.heading.complete_heading() {
                    write!(
                        self.output,
                        r#"<h{heading_level} id="{id}">{}</h{heading_level}>"#,
                        html.trim()
                    )
                    .unwrap();
                } else {
                    let level_num = heading_level_to_num(level);
                    write!(self.output, "</h{level_num}>").unwrap();
                }
            }
            TagEnd::BlockQuote(_) => {
                self.output.push_str("</blockquote>");
            }
            TagEnd::CodeBlock => {
                let (lang, buffer) = self.code.end();
                if let Some(lang) = lang {
                    write!(
                        self.output,
                        r#"<pre><code class="language-{}">{}</code></pre>"#,
                        escape_html(&lang),
                        escape_html(&buffer)
                    )
                    .unwrap();
                } else {
                    write!(
                        self.output,
                        "<pre><code>{}</code></pre>",
                        escape_html(&buffer)
                    )
                    .unwrap();
                }
            }
            TagEnd::List(ordered) => {
                self.list_stack.pop();
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => {
                self.output.push_str("</li>");
            }
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                let alt_text = self.image.end();
                write!(self.output, r#" alt="{}">"#, escape_html(&alt_text)).unwrap();
            }
            TagEnd::DefinitionList => {
                self.output.push_str("</dl>");
            }
            TagEnd::DefinitionListTitle => {
                self.output.push_str("</dt>");
            }
            TagEnd::DefinitionListDefinition => {
                self.output.push_str("</dd>");
            }
            TagEnd::Table => {
                self.output.push_str("</tbody></table>");
            }
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.in_head = false;
            }
            TagEnd::TableRow => {
                self.output.push_str("</tr>");
            }
            TagEnd::TableCell => {
                self.output.push_str(if self.table.in_head { "</th>" } else { "</td>" });
                self.table.cell_index += 1;
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.active {
            self.code.buffer.push_str(text);
        } else if self.image.active {
            self.image.alt_text.push_str(text);
        } else if self.heading.is_active() {
            self.heading.text.push_str(text);
            self.heading.html.push_str(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.heading.is_active() {
            self.heading.text.push_str(code);
            write!(self.heading.html, "<code>{}</code>", escape_html(code)).unwrap();
        } else {
            write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
        }
    }

    fn raw_html(&mut self, html: &str) {
        self.output.push_str(html);
    }

    fn soft_break(&mut self) {
        if self.code.active {
            self.code.buffer.push('\n');
        } else if self.heading.is_active() {
            self.heading.text.push(' ');
            self.heading.html.push(' ');
        } else {
            // Preserve single newlines as line breaks.
            self.output.push_str("<br>\n");
        }
    }

    fn hard_break(&mut self) {
        self.output.push_str("<br>");
    }

    fn horizontal_rule(&mut self) {
        self.output.push_str("<hr>");
    }

    fn task_list_marker(&mut self, checked: bool) {
        if checked {
            self.output
                .push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            self.output.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert heading level enum to number.
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Convert text to URL-safe slug.
///
/// Converts to lowercase, replaces whitespace/dashes/underscores with single
/// dashes, and removes other non-alphanumeric characters.
fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
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
