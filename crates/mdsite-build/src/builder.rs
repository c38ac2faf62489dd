//! Build orchestration.
//!
//! One [`SiteBuilder::build`] call is a complete batch transformation:
//! clean previous output, discover the source tree, convert and rewrite
//! every in-scope document, copy assets into the mirrored subtree, then
//! render every page (placeholders included) through the shared template.
//! The discovery result is built once and flows read-only through the later
//! phases; documents are processed strictly sequentially.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use mdsite_renderer::escape_html;
use mdsite_site::{
    GENERATED_SUBDIR, INDEX_PAGE, NavNode, RewriteContext, ScanError, SitePath, SiteScan,
    TEMPLATE_FILE, map_asset, page_title, rewrite_fragment, scan,
};

use crate::template::{PageTemplate, render_nav_tree};

/// Name of the static-assets subtree, preserved verbatim across rebuilds.
const ASSETS_SUBDIR: &str = "assets";

/// Fragment used when the source root has no index document.
const DEFAULT_HOME_HTML: &str = "<h1>Welcome</h1><p>This is the documentation home page.</p>";

/// Configuration for a site build.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Root directory of the Markdown sources.
    pub source_dir: PathBuf,
    /// Output directory of the generated site.
    pub output_dir: PathBuf,
    /// Ordered top-level publish list; empty publishes everything.
    pub top: Vec<String>,
}

/// Error returned by the builder.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The source directory does not exist. The only fatal precondition.
    #[error("Source directory not found: {}", .0.display())]
    SourceDirNotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl From<ScanError> for BuildError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::SourceRootNotFound(path) => Self::SourceDirNotFound(path),
            ScanError::Io(err) => Self::Io(err),
        }
    }
}

/// Counters reported after a successful build.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildSummary {
    /// Pages written, placeholders included.
    pub pages: usize,
    /// Asset files copied into the mirrored subtree.
    pub assets: usize,
}

/// Builds a static documentation site from a Markdown source tree.
pub struct SiteBuilder {
    config: BuildConfig,
}

impl SiteBuilder {
    /// Create a new builder with the given configuration.
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Run a full build and return page/asset counters.
    pub fn build(&self) -> Result<BuildSummary, BuildError> {
        if !self.config.source_dir.is_dir() {
            return Err(BuildError::SourceDirNotFound(self.config.source_dir.clone()));
        }
        let source_root = self.config.source_dir.canonicalize()?;

        self.clean_output()?;

        info!(source = %source_root.display(), "Scanning source tree");
        let site = scan(&source_root, &self.config.top)?;

        info!(documents = site.mapping.len(), "Converting documents");
        let fragments = convert_documents(&source_root, &site);

        let assets = self.copy_assets(&source_root)?;

        let template = PageTemplate::load(&self.config.output_dir);
        let pages = self.render_pages(&template, &site, &fragments)?;

        info!(pages, assets, "Build finished");
        Ok(BuildSummary { pages, assets })
    }

    /// Remove generated output, preserving the page template and the
    /// static-assets subtree.
    fn clean_output(&self) -> io::Result<()> {
        let output = &self.config.output_dir;
        fs::create_dir_all(output)?;

        for entry in output.read_dir()? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            if path.is_dir() {
                if name != ASSETS_SUBDIR && name != GENERATED_SUBDIR {
                    fs::remove_dir_all(&path)?;
                }
            } else if name.ends_with(".html") && name != TEMPLATE_FILE {
                fs::remove_file(&path)?;
            }
        }

        // The generated subtree is rebuilt from scratch so pages of deleted
        // documents cannot survive.
        let generated = output.join(GENERATED_SUBDIR);
        if generated.exists() {
            fs::remove_dir_all(&generated)?;
        }
        fs::create_dir_all(generated)?;
        fs::create_dir_all(output.join(ASSETS_SUBDIR))?;
        Ok(())
    }

    /// Copy non-document files into the mirrored generated subtree,
    /// honoring the publish scope.
    fn copy_assets(&self, source_root: &Path) -> Result<usize, BuildError> {
        let mut count = 0;
        if self.config.top.is_empty() {
            count += self.copy_tree(source_root, source_root)?;
        } else {
            for name in &self.config.top {
                let dir = source_root.join(name);
                if dir.is_dir() {
                    count += self.copy_tree(source_root, &dir)?;
                }
            }
        }
        Ok(count)
    }

    fn copy_tree(&self, source_root: &Path, dir: &Path) -> Result<usize, BuildError> {
        let mut count = 0;
        for entry in dir.read_dir()? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            if path.is_dir() {
                count += self.copy_tree(source_root, &path)?;
                continue;
            }
            if name.ends_with(".md") || name == TEMPLATE_FILE {
                continue;
            }
            let rel = path
                .strip_prefix(source_root)
                .expect("asset lies under the source root");
            let dest = self.config.output_dir.join(map_asset(rel).as_str());
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            match fs::copy(&path, &dest) {
                Ok(_) => count += 1,
                Err(err) => {
                    warn!(asset = %path.display(), error = %err, "Skipping uncopyable asset");
                }
            }
        }
        Ok(count)
    }

    /// Render every fragment, then placeholder pages for directories
    /// without an index document.
    fn render_pages(
        &self,
        template: &PageTemplate,
        site: &SiteScan,
        fragments: &BTreeMap<SitePath, String>,
    ) -> Result<usize, BuildError> {
        let mut count = 0;
        for (path, content) in fragments {
            self.render_page(template, site, path, content)?;
            count += 1;
        }
        count += self.render_placeholders(template, site, &site.nav, fragments)?;
        Ok(count)
    }

    fn render_placeholders(
        &self,
        template: &PageTemplate,
        site: &SiteScan,
        nodes: &[NavNode],
        fragments: &BTreeMap<SitePath, String>,
    ) -> Result<usize, BuildError> {
        let mut count = 0;
        for node in nodes {
            if let NavNode::Directory {
                name,
                path,
                has_index,
                children,
            } = node
            {
                if !*has_index && !fragments.contains_key(path) {
                    let content = format!(
                        "<h1>{}</h1><p>This section has no content yet.</p>",
                        escape_html(name)
                    );
                    self.render_page(template, site, path, &content)?;
                    count += 1;
                }
                count += self.render_placeholders(template, site, children, fragments)?;
            }
        }
        Ok(count)
    }

    /// Assemble one page and write it to its output location.
    fn render_page(
        &self,
        template: &PageTemplate,
        site: &SiteScan,
        path: &SitePath,
        content: &str,
    ) -> Result<(), BuildError> {
        let title = page_title(path);
        let base_path = asset_base(path.depth());
        let nav_tree = render_nav_tree(&site.nav, path, &base_path);
        let html = template.render_page(&title, content, &nav_tree, &base_path)?;

        let dest = self.config.output_dir.join(path.as_str());
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, html)?;
        debug!(page = %path, "Wrote page");
        Ok(())
    }
}

/// Convert and rewrite every mapped document, keyed by output path.
///
/// Adds the default home fragment when no root index document exists.
fn convert_documents(source_root: &Path, site: &SiteScan) -> BTreeMap<SitePath, String> {
    let mut fragments = BTreeMap::new();

    for (rel, output) in site.mapping.iter() {
        let source_doc = source_root.join(rel);
        let raw = match fs::read_to_string(&source_doc) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(document = rel, error = %err, "Skipping unreadable document");
                continue;
            }
        };
        let html = mdsite_renderer::convert(&raw);
        let ctx = RewriteContext {
            current: output,
            source_doc: &source_doc,
            source_root,
            mapping: &site.mapping,
        };
        fragments.insert(output.clone(), rewrite_fragment(&html, &ctx));
    }

    let root = SitePath::new(INDEX_PAGE);
    if !fragments.contains_key(&root) {
        info!("No root index document, generating default home page");
        fragments.insert(root, DEFAULT_HOME_HTML.to_owned());
    }

    fragments
}

/// Relative prefix from a page at `depth` back up to the output root.
fn asset_base(depth: usize) -> String {
    if depth == 0 {
        "./".to_owned()
    } else {
        "../".repeat(depth)
    }
}
