//! CLI error types.

use mdsite_build::BuildError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Build(#[from] BuildError),
}
