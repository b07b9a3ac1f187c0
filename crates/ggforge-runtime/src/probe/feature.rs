use std::ffi::OsString;
use std::sync::Arc;

use ggforge_core::ports::{CommandError, CommandExecutor, CommandOutput, CommandSpec, FeatureProbe};
use ggforge_core::{ProbeTimeouts, ProbeVerdict};
use tracing::debug;

use super::workspace::ProbeWorkspace;

/// Confirms candidate flags by configuring, building and running a small
/// CMake project in a throwaway directory.
pub struct CmakeFeatureProbe {
    executor: Arc<dyn CommandExecutor>,
    timeouts: ProbeTimeouts,
    cmake: OsString,
}

impl CmakeFeatureProbe {
    pub fn new(executor: Arc<dyn CommandExecutor>, timeouts: ProbeTimeouts) -> Self {
        Self {
            executor,
            timeouts,
            cmake: OsString::from("cmake"),
        }
    }

    /// Use a specific cmake binary instead of the one on `PATH`.
    #[must_use]
    pub fn with_cmake(mut self, cmake: impl Into<OsString>) -> Self {
        self.cmake = cmake.into();
        self
    }

    fn run_step(&self, step: &str, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let result = self.executor.run(spec);
        match &result {
            Ok(out) if !out.success() => {
                debug!(step, code = ?out.code, stderr = %out.stderr.trim(), "Probe step failed");
            }
            Err(e) => debug!(step, error = %e, "Probe step did not complete"),
            Ok(_) => {}
        }
        result
    }

    fn probe_in(&self, workspace: &ProbeWorkspace, flags: &[String]) -> ProbeVerdict {
        let configure = CommandSpec::new(&self.cmake, self.timeouts.configure)
            .arg("-B")
            .arg(workspace.build_dir())
            .arg("-S")
            .arg(workspace.source_dir())
            .args(flags);
        match self.run_step("configure", &configure) {
            Ok(out) if out.success() => {}
            Ok(_) | Err(CommandError::TimedOut { .. }) => return ProbeVerdict::ConfigureFailed,
            Err(_) => return ProbeVerdict::BuildFailed,
        }

        let build = CommandSpec::new(&self.cmake, self.timeouts.build)
            .arg("--build")
            .arg(workspace.build_dir());
        match self.run_step("build", &build) {
            Ok(out) if out.success() => {}
            _ => return ProbeVerdict::BuildFailed,
        }

        let Some(artifact) = workspace.artifact() else {
            return ProbeVerdict::Passed;
        };
        let run = CommandSpec::new(artifact, self.timeouts.run).current_dir(workspace.build_dir());
        match self.run_step("run", &run) {
            Ok(out) if out.success() => ProbeVerdict::Passed,
            Ok(_) | Err(CommandError::TimedOut { .. }) => ProbeVerdict::RunFailed,
            Err(_) => ProbeVerdict::BuildFailed,
        }
    }
}

impl FeatureProbe for CmakeFeatureProbe {
    fn probe(&self, flags: &[String]) -> ProbeVerdict {
        let workspace = match ProbeWorkspace::create(flags) {
            Ok(workspace) => workspace,
            Err(e) => {
                debug!(error = %e, "Cannot create probe workspace");
                return ProbeVerdict::BuildFailed;
            }
        };
        let verdict = self.probe_in(&workspace, flags);
        debug!(flags = ?flags, %verdict, "Probe finished");
        verdict
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::probe::workspace::TARGET_NAME;

    /// Scripted executor: answers each call in order and records the specs.
    struct Scripted {
        answers: Mutex<Vec<Result<CommandOutput, CommandError>>>,
        seen: Mutex<Vec<CommandSpec>>,
        /// Create the probe binary when the build step runs.
        emit_artifact: bool,
    }

    impl Scripted {
        fn new(answers: Vec<Result<CommandOutput, CommandError>>, emit_artifact: bool) -> Self {
            let mut answers = answers;
            answers.reverse();
            Self {
                answers: Mutex::new(answers),
                seen: Mutex::new(Vec::new()),
                emit_artifact,
            }
        }

        fn seen(&self) -> Vec<CommandSpec> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl CommandExecutor for Scripted {
        fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
            if self.emit_artifact && spec.args.first().is_some_and(|a| a == "--build") {
                let build_dir = PathBuf::from(&spec.args[1]);
                std::fs::write(build_dir.join(TARGET_NAME), b"").unwrap();
            }
            self.seen.lock().unwrap().push(spec.clone());
            self.answers.lock().unwrap().pop().expect("unexpected command")
        }
    }

    fn exit(code: i32) -> Result<CommandOutput, CommandError> {
        Ok(CommandOutput {
            code: Some(code),
            ..CommandOutput::default()
        })
    }

    fn timed_out() -> Result<CommandOutput, CommandError> {
        Err(CommandError::TimedOut {
            program: "cmake".to_string(),
            timeout: Duration::from_secs(1),
        })
    }

    fn spawn_failed() -> Result<CommandOutput, CommandError> {
        Err(CommandError::Spawn {
            program: "cmake".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }

    fn probe_with(exec: &Arc<Scripted>) -> CmakeFeatureProbe {
        CmakeFeatureProbe::new(exec.clone(), ProbeTimeouts::default())
    }

    fn flags() -> Vec<String> {
        vec!["-DGGML_AVX=ON".to_string()]
    }

    #[test]
    fn test_all_steps_pass() {
        let exec = Arc::new(Scripted::new(vec![exit(0), exit(0), exit(0)], true));
        assert_eq!(probe_with(&exec).probe(&flags()), ProbeVerdict::Passed);

        let seen = exec.seen();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].timeout, Duration::from_secs(30));
        assert!(seen[0].args.iter().any(|a| a == "-DGGML_AVX=ON"));
        assert_eq!(seen[1].timeout, Duration::from_secs(60));
        assert_eq!(seen[2].timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_configure_failure_short_circuits() {
        let exec = Arc::new(Scripted::new(vec![exit(1)], true));
        assert_eq!(probe_with(&exec).probe(&flags()), ProbeVerdict::ConfigureFailed);
        assert_eq!(exec.seen().len(), 1);
    }

    #[test]
    fn test_configure_timeout_is_configure_failed() {
        let exec = Arc::new(Scripted::new(vec![timed_out()], true));
        assert_eq!(probe_with(&exec).probe(&flags()), ProbeVerdict::ConfigureFailed);
    }

    #[test]
    fn test_missing_cmake_is_build_failed() {
        let exec = Arc::new(Scripted::new(vec![spawn_failed()], true));
        assert_eq!(probe_with(&exec).probe(&flags()), ProbeVerdict::BuildFailed);
    }

    #[test]
    fn test_build_timeout_is_build_failed_and_workspace_removed() {
        let exec = Arc::new(Scripted::new(vec![exit(0), timed_out()], true));
        assert_eq!(probe_with(&exec).probe(&flags()), ProbeVerdict::BuildFailed);

        let seen = exec.seen();
        assert_eq!(seen.len(), 2);
        let build_dir = PathBuf::from(&seen[1].args[1]);
        assert!(!build_dir.exists());
        assert!(!build_dir.parent().unwrap().exists());
    }

    #[test]
    fn test_run_failure() {
        let exec = Arc::new(Scripted::new(vec![exit(0), exit(0), exit(132)], true));
        assert_eq!(probe_with(&exec).probe(&flags()), ProbeVerdict::RunFailed);
    }

    #[test]
    fn test_missing_artifact_passes_without_running() {
        let exec = Arc::new(Scripted::new(vec![exit(0), exit(0)], false));
        assert_eq!(probe_with(&exec).probe(&flags()), ProbeVerdict::Passed);
        assert_eq!(exec.seen().len(), 2);
    }
}
