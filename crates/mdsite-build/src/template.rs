//! Page templating and navigation markup.
//!
//! The final page is assembled by minijinja from the reserved
//! `template.html` in the output root, with placeholders for `title`,
//! `content`, `nav_tree`, and `base_path`. Auto-escaping stays on for the
//! title; content and navigation are pre-rendered markup passed through as
//! safe values. When no template file exists a built-in one keeps the build
//! going.

use std::fs;
use std::path::Path;

use minijinja::value::Value;
use minijinja::{Environment, context};
use tracing::warn;

use mdsite_renderer::escape_html;
use mdsite_site::{NavNode, SitePath, TEMPLATE_FILE};

/// Built-in fallback used when the output root has no `template.html`.
const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{ title }}</title>
<link rel="stylesheet" href="{{ base_path }}assets/style.css">
</head>
<body>
<div class="page">
<aside class="sidebar"><nav><ul class="nav-tree">
{{ nav_tree }}
</ul></nav></aside>
<main class="content">
{{ content }}
</main>
</div>
</body>
</html>
"#;

/// The shared page template, loaded once per build.
pub struct PageTemplate {
    env: Environment<'static>,
}

impl PageTemplate {
    /// Load `template.html` from the output root, falling back to the
    /// built-in template when the file is missing or does not parse.
    #[must_use]
    pub fn load(output_root: &Path) -> Self {
        let mut env = Environment::new();
        let path = output_root.join(TEMPLATE_FILE);

        let added = match fs::read_to_string(&path) {
            Ok(source) => env
                .add_template_owned(TEMPLATE_FILE.to_owned(), source)
                .map_err(|err| {
                    warn!(path = %path.display(), error = %err, "Template does not parse, using built-in template");
                }),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "No page template, using built-in template");
                Err(())
            }
        };

        if added.is_err() {
            env.add_template(TEMPLATE_FILE, DEFAULT_TEMPLATE)
                .expect("built-in template parses");
        }

        Self { env }
    }

    /// Assemble a final page. `content` and `nav_tree` are trusted markup;
    /// `title` is escaped by the engine.
    pub fn render_page(
        &self,
        title: &str,
        content: &str,
        nav_tree: &str,
        base_path: &str,
    ) -> Result<String, minijinja::Error> {
        let template = self.env.get_template(TEMPLATE_FILE)?;
        template.render(context! {
            title,
            content => Value::from_safe_string(content.to_owned()),
            nav_tree => Value::from_safe_string(nav_tree.to_owned()),
            base_path,
        })
    }
}

/// Render the navigation tree as nested list markup.
///
/// The node whose path matches `current`, and every directory whose subtree
/// contains it, is marked active; active directories render expanded.
/// Hrefs are prefixed with `base_path` so they stay valid at any depth.
#[must_use]
pub fn render_nav_tree(nodes: &[NavNode], current: &SitePath, base_path: &str) -> String {
    let mut lines = Vec::new();
    render_nav_items(nodes, current, base_path, &mut lines);
    lines.join("\n")
}

fn render_nav_items(nodes: &[NavNode], current: &SitePath, base_path: &str, lines: &mut Vec<String>) {
    for node in nodes {
        match node {
            NavNode::Directory {
                name,
                path,
                children,
                ..
            } => {
                let has_children = !children.is_empty();
                let is_active = current == path
                    || (!path.dir().is_empty()
                        && current.as_str().starts_with(&format!("{}/", path.dir())));

                let mut icon_class = "nav-link-icon".to_owned();
                if has_children && is_active {
                    icon_class.push_str(" expanded");
                }
                let mut link_class = "nav-link".to_owned();
                if has_children {
                    link_class.push_str(" has-children");
                }
                if is_active {
                    link_class.push_str(" active");
                }

                lines.push("<li class=\"nav-item\">".to_owned());
                lines.push(format!("<div class=\"{link_class}\">"));
                if has_children {
                    lines.push(format!(
                        "<span class=\"{icon_class}\" data-toggle=\"collapse\"></span>"
                    ));
                } else {
                    lines.push(spacer_icon());
                }
                lines.push(nav_link(name, path, base_path));
                lines.push("</div>".to_owned());

                if has_children {
                    let expanded = if is_active { " expanded" } else { "" };
                    lines.push(format!("<ul class=\"nav-children{expanded}\">"));
                    render_nav_items(children, current, base_path, lines);
                    lines.push("</ul>".to_owned());
                }

                lines.push("</li>".to_owned());
            }
            NavNode::Page { name, path } => {
                let is_active = current == path;
                let link_class = if is_active { "nav-link active" } else { "nav-link" };

                lines.push("<li class=\"nav-item\">".to_owned());
                lines.push(format!("<div class=\"{link_class}\">"));
                lines.push(spacer_icon());
                lines.push(nav_link(name, path, base_path));
                lines.push("</div>".to_owned());
                lines.push("</li>".to_owned());
            }
        }
    }
}

fn spacer_icon() -> String {
    "<span class=\"nav-link-icon\" style=\"width: 20px; margin-right: 4px;\"></span>".to_owned()
}

fn nav_link(name: &str, path: &SitePath, base_path: &str) -> String {
    format!(
        "<a href=\"{base_path}{path}\" class=\"nav-link-text\" data-path=\"{path}\">{}</a>",
        escape_html(name)
    )
}
