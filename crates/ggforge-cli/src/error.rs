//! CLI-specific error types and mappings.
//!
//! Library errors are folded into [`CliError`] at the handler boundary so
//! `main` can pick an exit code.

use ggforge_core::{ConfigError, CustomConfigError, PathError};
use ggforge_runtime::InstallError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Argument combination that cannot be acted on.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    #[error("IO error: {0}")]
    Io(String),

    /// Environment or flags file problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required system packages are not installed.
    #[error("Missing dependencies: {0}")]
    Dependencies(String),

    /// An external build step failed.
    #[error("Installation failed: {0}")]
    Install(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Follows sysexits.h where a category fits:
    /// - 2: invalid arguments
    /// - 69: missing dependencies (EX_UNAVAILABLE)
    /// - 70: external build step failed (EX_SOFTWARE)
    /// - 74: I/O (EX_IOERR)
    /// - 78: configuration (EX_CONFIG)
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) => 2,
            Self::Dependencies(_) => 69,
            Self::Install(_) => 70,
            Self::Io(_) => 74,
            Self::Config(_) => 78,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<CustomConfigError> for CliError {
    fn from(err: CustomConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<InstallError> for CliError {
    fn from(err: InstallError) -> Self {
        match err {
            InstallError::MissingDependencies { missing, .. } => {
                Self::Dependencies(missing.join(", "))
            }
            InstallError::Path(e) => e.into(),
            InstallError::CustomConfig(e) => e.into(),
            InstallError::Io(e) => e.into(),
            other => Self::Install(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_install_errors_map_to_categories() {
        let missing = InstallError::MissingDependencies {
            missing: vec!["cmake".to_string(), "git".to_string()],
            instructions: Vec::new(),
        };
        let err = CliError::from(missing);
        assert_eq!(err.exit_code(), 69);
        assert_eq!(err.to_string(), "Missing dependencies: cmake, git");

        let err = CliError::from(InstallError::CompileFailed { code: Some(2) });
        assert_eq!(err.exit_code(), 70);

        let err = CliError::from(InstallError::CustomConfig(CustomConfigError::NotFound(
            PathBuf::from("/nope.txt"),
        )));
        assert_eq!(err.exit_code(), 78);

        let err = CliError::from(InstallError::Path(PathError::EmptyPath));
        assert_eq!(err.exit_code(), 74);
    }
}
