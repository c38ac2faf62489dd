//! `mdsite build` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdsite_build::{BuildConfig, SiteBuilder};
use mdsite_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdsite.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
        };
        let config = Config::load(self.config.as_deref(), &cli_settings);

        output.info(&format!("Source: {}", config.source_dir.display()));
        output.info(&format!("Output: {}", config.output_dir.display()));

        let builder = SiteBuilder::new(BuildConfig {
            source_dir: config.source_dir,
            output_dir: config.output_dir,
            top: config.top,
        });
        let summary = builder.build()?;

        output.success(&format!(
            "Site built successfully: {} pages, {} assets",
            summary.pages, summary.assets
        ));
        Ok(())
    }
}
