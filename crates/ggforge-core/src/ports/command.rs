//! Command execution port.
//!
//! Every external step the probes take (cmake, the verification binary,
//! pkg-config, dpkg) goes through [`CommandExecutor`]: a blocking call that
//! returns exit status plus captured output, bounded by an explicit timeout.
//! Adapters kill the child when the deadline passes.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A single external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Result of a command that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Reasons a command produced no exit status.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' did not finish within {}s and was killed", timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

/// Runs external commands synchronously.
pub trait CommandExecutor: Send + Sync {
    /// Run to completion or until `spec.timeout` elapses.
    ///
    /// A non-zero exit is `Ok` with the code in [`CommandOutput`]; only spawn
    /// failures, timeouts and pipe errors are `Err`.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_display_joins_args() {
        let spec = CommandSpec::new("cmake", Duration::from_secs(30))
            .args(["-B", "build"])
            .arg("-DGGML_AVX=ON");
        assert_eq!(spec.to_string(), "cmake -B build -DGGML_AVX=ON");
        assert_eq!(spec.program_name(), "cmake");
    }

    #[test]
    fn test_output_success() {
        let ok = CommandOutput {
            code: Some(0),
            ..Default::default()
        };
        let killed = CommandOutput::default();
        assert!(ok.success());
        assert!(!killed.success());
    }

    #[test]
    fn test_timeout_message() {
        let err = CommandError::TimedOut {
            program: "cmake".to_string(),
            timeout: Duration::from_secs(60),
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "'cmake' did not finish within 60s and was killed");
    }
}
