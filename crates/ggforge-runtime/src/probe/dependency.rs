use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ggforge_core::ports::{CommandExecutor, CommandSpec, DependencyProbe};
use ggforge_core::OptionalLibrary;
use tracing::debug;

/// Library presence via `pkg-config`, with well-known paths as a second
/// signal for BLAS.
pub struct PkgConfigDependencyProbe {
    executor: Arc<dyn CommandExecutor>,
    timeout: Duration,
    root: PathBuf,
}

impl PkgConfigDependencyProbe {
    pub fn new(executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        Self {
            executor,
            timeout,
            root: PathBuf::from("/"),
        }
    }

    /// Resolve fallback library paths under `root` instead of `/`.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Version reported by pkg-config, `None` if the package is unknown or
    /// the query failed.
    fn pkg_config_version(&self, package: &str) -> Option<String> {
        let spec = CommandSpec::new("pkg-config", self.timeout)
            .arg("--modversion")
            .arg(package);
        match self.executor.run(&spec) {
            Ok(out) if out.success() => Some(out.stdout.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                debug!(package, error = %e, "pkg-config query failed");
                None
            }
        }
    }
}

impl DependencyProbe for PkgConfigDependencyProbe {
    fn is_available(&self, library: OptionalLibrary) -> bool {
        if let Some(version) = self.pkg_config_version(library.pkg_config_name()) {
            debug!(%library, %version, "Found via pkg-config");
            return true;
        }
        let found = library.fallback_present(&self.root);
        debug!(%library, found, "pkg-config miss, checked fallback paths");
        found
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use ggforge_core::ports::{CommandError, CommandOutput};

    use super::*;

    struct FakePkgConfig {
        known: Vec<&'static str>,
        fail: bool,
        queried: Mutex<Vec<String>>,
    }

    impl FakePkgConfig {
        fn knowing(known: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                known,
                fail: false,
                queried: Mutex::new(Vec::new()),
            })
        }

        fn broken() -> Arc<Self> {
            Arc::new(Self {
                known: Vec::new(),
                fail: true,
                queried: Mutex::new(Vec::new()),
            })
        }
    }

    impl CommandExecutor for FakePkgConfig {
        fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
            let package = spec.args[1].to_string_lossy().into_owned();
            self.queried.lock().unwrap().push(package.clone());
            if self.fail {
                return Err(CommandError::TimedOut {
                    program: spec.program_name(),
                    timeout: spec.timeout,
                });
            }
            let found = self.known.contains(&package.as_str());
            Ok(CommandOutput {
                code: Some(i32::from(!found)),
                stdout: if found { "0.3.26\n".to_string() } else { String::new() },
                stderr: String::new(),
            })
        }
    }

    fn empty_root() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_pkg_config_hit() {
        let root = empty_root();
        let exec = FakePkgConfig::knowing(vec!["libcurl"]);
        let probe = PkgConfigDependencyProbe::new(exec.clone(), Duration::from_secs(5))
            .with_root(root.path());

        assert!(probe.is_available(OptionalLibrary::Curl));
        assert!(!probe.is_available(OptionalLibrary::OpenMp));
        assert_eq!(*exec.queried.lock().unwrap(), vec!["libcurl", "openmp"]);
    }

    #[test]
    fn test_blas_fallback_path() {
        let root = empty_root();
        let lib = root.path().join("usr/lib");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("libopenblas.so"), b"").unwrap();

        let probe = PkgConfigDependencyProbe::new(FakePkgConfig::knowing(vec![]), Duration::from_secs(5))
            .with_root(root.path());
        assert!(probe.is_available(OptionalLibrary::Blas));
    }

    #[test]
    fn test_query_failure_is_unavailable() {
        let root = empty_root();
        let probe = PkgConfigDependencyProbe::new(FakePkgConfig::broken(), Duration::from_secs(5))
            .with_root(root.path());
        for library in OptionalLibrary::ALL {
            assert!(!probe.is_available(library));
        }
    }
}
