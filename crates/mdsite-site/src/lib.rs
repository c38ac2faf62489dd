//! Site structure for mdsite.
//!
//! This crate owns the path conventions of a generated site:
//! - [`SitePath`]: structured output-path value type with central
//!   depth/relative-path logic
//! - [`map_document`] / [`map_asset`]: source path to output path mapping
//! - [`scan`]: navigation tree + path mapping built from a source tree walk
//! - [`rewrite_fragment`]: link and image rewriting for converted HTML
//!
//! # Architecture
//!
//! Discovery is a strict two-phase contract: [`scan`] walks the source tree
//! once and returns an immutable [`SiteScan`] (navigation tree plus
//! [`PathMapping`]). Everything downstream - rewriting, page rendering -
//! receives that value as a read-only input. No shared mutable state.

mod mapper;
mod nav;
mod rewrite;
mod sitepath;

pub use mapper::{
    GENERATED_SUBDIR, INDEX_DOC, INDEX_PAGE, TEMPLATE_FILE, display_name, map_asset, map_document,
    page_title,
};
pub use nav::{NavNode, PathMapping, ScanError, SiteScan, scan};
pub use rewrite::{RewriteContext, rewrite_fragment};
pub use sitepath::SitePath;
