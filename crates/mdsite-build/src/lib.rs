//! Static site assembly for mdsite.
//!
//! [`SiteBuilder`] sequences a full build: clean the previous output, walk
//! the source tree, convert every in-scope document, copy assets, and render
//! each page through the shared template with an injected navigation
//! sidebar. [`PageTemplate`] wraps the template engine behind a narrow
//! interface.

mod builder;
mod template;

pub use builder::{BuildConfig, BuildError, BuildSummary, SiteBuilder};
pub use template::{PageTemplate, render_nav_tree};
