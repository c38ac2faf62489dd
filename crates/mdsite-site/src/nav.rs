//! Navigation tree and path mapping built from a source tree walk.
//!
//! [`scan`] is the single discovery pass of a build: it walks the source
//! root once, maps every document it accepts, and returns an immutable
//! [`SiteScan`]. Directory ordering at the top level is driven by the
//! configured publish list; everything below is lexical, subdirectories
//! first, then files.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::mapper::{GENERATED_SUBDIR, INDEX_DOC, INDEX_PAGE, TEMPLATE_FILE, display_name, map_document};
use crate::sitepath::SitePath;

/// Error returned by the discovery pass.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The source root does not exist. The only build-aborting condition.
    #[error("Source directory not found: {}", .0.display())]
    SourceRootNotFound(PathBuf),
    /// The source root exists but cannot be enumerated.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A node in the navigation tree.
///
/// Leaves never have children. A directory without an index document still
/// carries a (synthetic) output path; the builder generates a placeholder
/// page there so every navigation target resolves to real content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavNode {
    Directory {
        /// Directory name, verbatim.
        name: String,
        /// Index page of the directory, real or synthetic.
        path: SitePath,
        /// Whether an index document backs this directory.
        has_index: bool,
        children: Vec<NavNode>,
    },
    Page {
        /// Display label derived from the file stem.
        name: String,
        path: SitePath,
    },
}

/// Immutable mapping from source-root-relative document paths to output
/// paths. Populated once during [`scan`], consulted by every downstream
/// phase.
#[derive(Clone, Debug, Default)]
pub struct PathMapping {
    entries: BTreeMap<String, SitePath>,
}

impl PathMapping {
    /// Look up the output path for a source-root-relative document path.
    #[must_use]
    pub fn lookup(&self, source_rel: &str) -> Option<&SitePath> {
        self.entries.get(source_rel)
    }

    /// Iterate entries in deterministic (lexical) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SitePath)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn register(&mut self, source_rel: String, output: SitePath) {
        self.entries.insert(source_rel, output);
    }
}

/// Result of the discovery pass: the ordered navigation tree and the
/// document path mapping.
#[derive(Clone, Debug, Default)]
pub struct SiteScan {
    pub nav: Vec<NavNode>,
    pub mapping: PathMapping,
}

/// Walk the source tree and build navigation tree plus path mapping.
///
/// With a non-empty `top_level_order`, exactly the named top-level
/// directories are processed, in that order; names missing on disk and
/// directories missing from the list are skipped with a warning (partial
/// publish). With an empty order every non-hidden top-level directory is
/// processed in lexical order.
///
/// A root `README.md` is registered in the mapping up front; it is published
/// as the root index page but never shown in the navigation tree.
pub fn scan(source_root: &Path, top_level_order: &[String]) -> Result<SiteScan, ScanError> {
    if !source_root.is_dir() {
        return Err(ScanError::SourceRootNotFound(source_root.to_path_buf()));
    }

    let mut mapping = PathMapping::default();
    if source_root.join(INDEX_DOC).is_file() {
        mapping.register(INDEX_DOC.to_owned(), SitePath::new(INDEX_PAGE));
    }

    let top_dirs = read_dir_names(source_root)?;
    let mut nav = Vec::new();

    if top_level_order.is_empty() {
        for name in &top_dirs {
            nav.push(scan_directory(source_root, &source_root.join(name), &mut mapping));
        }
    } else {
        for name in top_level_order {
            if top_dirs.iter().any(|d| d == name) {
                nav.push(scan_directory(source_root, &source_root.join(name), &mut mapping));
            } else {
                warn!(directory = %name, "Configured top-level directory not found in source tree");
            }
        }
        let skipped: Vec<&String> = top_dirs
            .iter()
            .filter(|d| !top_level_order.contains(*d))
            .collect();
        if !skipped.is_empty() {
            let names: Vec<&str> = skipped.iter().map(|s| s.as_str()).collect();
            warn!(
                directories = %names.join(", "),
                "Top-level directories absent from configuration, skipping"
            );
        }
    }

    Ok(SiteScan { nav, mapping })
}

/// Recursively build the navigation node for one directory, registering
/// every accepted document in the mapping.
fn scan_directory(source_root: &Path, dir: &Path, mapping: &mut PathMapping) -> NavNode {
    let rel = dir
        .strip_prefix(source_root)
        .expect("directory lies under the source root");
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (subdirs, files) = match read_dir_split(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(directory = %dir.display(), error = %err, "Skipping unreadable directory");
            (Vec::new(), Vec::new())
        }
    };

    let mut children = Vec::new();
    for sub in &subdirs {
        children.push(scan_directory(source_root, &dir.join(sub), mapping));
    }
    for file in &files {
        let file_rel = rel.join(file);
        let path = map_document(&file_rel);
        mapping.register(slash_path(&file_rel), path.clone());
        let stem = file.strip_suffix(".md").unwrap_or(file);
        children.push(NavNode::Page {
            name: display_name(stem),
            path,
        });
    }

    let has_index = dir.join(INDEX_DOC).is_file();
    let path = if has_index {
        let index_rel = rel.join(INDEX_DOC);
        let path = map_document(&index_rel);
        mapping.register(slash_path(&index_rel), path.clone());
        path
    } else {
        SitePath::from_segments([GENERATED_SUBDIR, slash_path(rel).as_str(), INDEX_PAGE])
    };

    NavNode::Directory {
        name,
        path,
        has_index,
        children,
    }
}

/// Non-hidden subdirectory names of `dir`, lexically sorted.
fn read_dir_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in dir.read_dir()? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_dir() && !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Split a directory into (subdirectories, documents), each lexically
/// sorted. Hidden entries, the directory's own index document, and the
/// reserved template file are excluded.
fn read_dir_split(dir: &Path) -> io::Result<(Vec<String>, Vec<String>)> {
    let mut subdirs = Vec::new();
    let mut files = Vec::new();
    for entry in dir.read_dir()? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(name);
        } else if name.ends_with(".md") && name != INDEX_DOC && name != TEMPLATE_FILE {
            files.push(name);
        }
    }
    subdirs.sort();
    files.sort();
    Ok((subdirs, files))
}

/// Relative path as a `/`-separated string.
fn slash_path(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}
