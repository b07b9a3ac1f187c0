//! Error type for the install pipeline.

use std::path::PathBuf;

use ggforge_core::{CustomConfigError, PathError};
use thiserror::Error;

/// Errors that stop an installation.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Required packages are absent and could not be installed automatically.
    #[error("missing dependencies: {}", missing.join(", "))]
    MissingDependencies {
        missing: Vec<String>,
        /// Commands the user can run to install them.
        instructions: Vec<String>,
    },

    /// The package manager ran but did not succeed.
    #[error("failed to install dependencies with '{command}' (exit code {code:?})")]
    DependencyInstallFailed { command: String, code: Option<i32> },

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git clone failed (exit code {code:?})")]
    FetchFailed { code: Option<i32> },

    #[error("CMake configuration failed (exit code {code:?})")]
    ConfigureFailed { code: Option<i32> },

    #[error("compilation failed (exit code {code:?})")]
    CompileFailed { code: Option<i32> },

    #[error("source directory does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("flag synthesis did not complete: {0}")]
    Synthesis(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    CustomConfig(#[from] CustomConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type InstallResult<T> = Result<T, InstallError>;
