//! System dependency checks and installation hints.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ggforge_core::ports::{CommandExecutor, CommandSpec};
use tracing::{debug, warn};

/// Package manager inferred from its configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Yum,
    Pacman,
    Unknown,
}

impl PackageManager {
    /// Inspect well-known config files below `root`.
    pub fn detect(root: &Path) -> Self {
        let has = |relative: &str| root.join(relative).exists();
        if has("etc/apt/sources.list") {
            Self::Apt
        } else if has("etc/yum.conf") {
            Self::Yum
        } else if has("etc/pacman.conf") {
            Self::Pacman
        } else {
            Self::Unknown
        }
    }

    /// Shell commands (or a bullet list) that install `missing`.
    pub fn instructions(self, missing: &[String]) -> Vec<String> {
        let packages = missing.join(" ");
        match self {
            Self::Apt => vec![
                "sudo apt update".to_string(),
                format!("sudo apt install -y {packages}"),
            ],
            Self::Yum => vec![format!("sudo yum install -y {packages}")],
            Self::Pacman => vec![format!("sudo pacman -S --noconfirm {packages}")],
            Self::Unknown => missing.iter().map(|dep| format!("  - {dep}")).collect(),
        }
    }
}

/// Decides which required packages are missing from the host.
pub struct DependencyChecker {
    executor: Arc<dyn CommandExecutor>,
    timeout: Duration,
    search_path: Option<OsString>,
    root: PathBuf,
}

impl DependencyChecker {
    pub fn new(executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        Self {
            executor,
            timeout,
            search_path: None,
            root: PathBuf::from("/"),
        }
    }

    /// Look up commands in `path` instead of `$PATH`.
    #[must_use]
    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Resolve package-manager config files below `root`.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn package_manager(&self) -> PackageManager {
        PackageManager::detect(&self.root)
    }

    fn has_command(&self, name: &str) -> bool {
        let found = match &self.search_path {
            Some(path) => {
                let cwd = self.root.clone();
                which::which_in(name, Some(path), cwd).is_ok()
            }
            None => which::which(name).is_ok(),
        };
        debug!(command = name, found, "Command lookup");
        found
    }

    /// Whether dpkg reports the package as installed (`ii`).
    fn dpkg_installed(&self, package: &str) -> bool {
        let spec = CommandSpec::new("dpkg", self.timeout).arg("-l").arg(package);
        match self.executor.run(&spec) {
            Ok(out) => {
                out.success()
                    && out
                        .stdout
                        .lines()
                        .any(|line| line.starts_with("ii") && line.contains(package))
            }
            Err(e) => {
                debug!(package, error = %e, "dpkg query failed");
                false
            }
        }
    }

    /// Whether a single dependency is satisfied.
    ///
    /// `build-essential` is a meta package, so it is checked through `gcc`
    /// and `g++`; `-dev` packages install no command and go through dpkg.
    pub fn is_satisfied(&self, dependency: &str) -> bool {
        if dependency == "build-essential" {
            return self.has_command("gcc") && self.has_command("g++");
        }
        if dependency.ends_with("-dev") {
            return self.dpkg_installed(dependency);
        }
        self.has_command(dependency)
    }

    pub fn missing(&self, required: &[String]) -> Vec<String> {
        let missing: Vec<String> = required
            .iter()
            .filter(|dep| !self.is_satisfied(dep))
            .cloned()
            .collect();
        if missing.is_empty() {
            debug!(count = required.len(), "All dependencies present");
        } else {
            warn!(missing = ?missing, "Missing dependencies");
        }
        missing
    }
}
