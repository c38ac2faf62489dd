//! Configuration management for mdsite.
//!
//! Parses `mdsite.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Loading never fails the build: a missing, unreadable, or malformed file
//! degrades to the defaults (publish everything, lexical order) with a
//! warning. CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! # Ordered top-level publish list; empty or absent publishes everything.
//! top = ["jvm", "spring"]
//!
//! [docs]
//! source_dir = "src"
//! output_dir = "docs"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdsite.toml";

/// Default Markdown source directory.
const DEFAULT_SOURCE_DIR: &str = "src";

/// Default site output directory.
const DEFAULT_OUTPUT_DIR: &str = "docs";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the Markdown source directory.
    pub source_dir: Option<PathBuf>,
    /// Override the site output directory.
    pub output_dir: Option<PathBuf>,
}

/// Raw configuration as parsed from TOML (paths as strings).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    top: Vec<String>,
    docs: DocsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DocsSection {
    source_dir: Option<String>,
    output_dir: Option<String>,
}

/// Resolved application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Ordered list of top-level directories to publish. Empty means
    /// publish everything in lexical order.
    pub top: Vec<String>,
    /// Markdown source directory.
    pub source_dir: PathBuf,
    /// Site output directory.
    pub output_dir: PathBuf,
    /// Path to the config file the values came from, if any.
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top: Vec::new(),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            config_path: None,
        }
    }
}

impl Config {
    /// Load configuration, applying CLI overrides.
    ///
    /// `explicit` short-circuits auto-discovery; otherwise `mdsite.toml` is
    /// searched for in the working directory and its parents. Relative paths
    /// from a config file resolve against that file's directory. Any load
    /// problem degrades to defaults with a warning.
    #[must_use]
    pub fn load(explicit: Option<&Path>, cli: &CliSettings) -> Self {
        let path = explicit.map_or_else(Self::discover, |p| Some(p.to_path_buf()));

        let mut config = match path {
            Some(path) => Self::from_file(&path),
            None => Self::default(),
        };

        if let Some(source_dir) = &cli.source_dir {
            config.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &cli.output_dir {
            config.output_dir.clone_from(output_dir);
        }
        config
    }

    /// Read and parse one config file, degrading to defaults on any failure.
    fn from_file(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Cannot read config file, using defaults");
                return Self::default();
            }
        };

        let file: ConfigFile = match toml::from_str(&contents) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Malformed config file, using defaults");
                return Self::default();
            }
        };

        let base = path.parent().unwrap_or(Path::new("."));
        Self {
            top: file.top,
            source_dir: resolve(base, file.docs.source_dir.as_deref().unwrap_or(DEFAULT_SOURCE_DIR)),
            output_dir: resolve(base, file.docs.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)),
            config_path: Some(path.to_path_buf()),
        }
    }

    /// Walk up from the working directory looking for `mdsite.toml`.
    fn discover() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let candidate = dir.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

/// Resolve a possibly-relative path against a base directory.
fn resolve(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_config() {
        let config = Config::load(Some(Path::new("/nonexistent/mdsite.toml")), &CliSettings::default());
        assert!(config.top.is_empty());
        assert_eq!(config.source_dir, PathBuf::from("src"));
        assert_eq!(config.output_dir, PathBuf::from("docs"));
        assert!(config.config_path.is_none());
    }

    #[test]
    fn full_config_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mdsite.toml");
        fs::write(
            &path,
            "top = [\"jvm\", \"spring\"]\n\n[docs]\nsource_dir = \"content\"\noutput_dir = \"site\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), &CliSettings::default());
        assert_eq!(config.top, vec!["jvm".to_owned(), "spring".to_owned()]);
        assert_eq!(config.source_dir, tmp.path().join("content"));
        assert_eq!(config.output_dir, tmp.path().join("site"));
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn malformed_config_degrades_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mdsite.toml");
        fs::write(&path, "top = not valid toml [").unwrap();

        let config = Config::load(Some(&path), &CliSettings::default());
        assert!(config.top.is_empty());
        assert_eq!(config.source_dir, PathBuf::from("src"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mdsite.toml");
        fs::write(&path, "top = [\"jvm\"]\n").unwrap();

        let config = Config::load(Some(&path), &CliSettings::default());
        assert_eq!(config.top, vec!["jvm".to_owned()]);
        assert_eq!(config.source_dir, tmp.path().join("src"));
        assert_eq!(config.output_dir, tmp.path().join("docs"));
    }

    #[test]
    fn cli_settings_override_file_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mdsite.toml");
        fs::write(&path, "[docs]\nsource_dir = \"content\"\n").unwrap();

        let cli = CliSettings {
            source_dir: Some(PathBuf::from("/override/src")),
            output_dir: None,
        };
        let config = Config::load(Some(&path), &cli);
        assert_eq!(config.source_dir, PathBuf::from("/override/src"));
        assert_eq!(config.output_dir, tmp.path().join("docs"));
    }

    #[test]
    fn absolute_paths_kept_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mdsite.toml");
        fs::write(&path, "[docs]\nsource_dir = \"/abs/src\"\n").unwrap();

        let config = Config::load(Some(&path), &CliSettings::default());
        assert_eq!(config.source_dir, PathBuf::from("/abs/src"));
    }
}
