use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Optional system libraries the build can link against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionalLibrary {
    Blas,
    OpenMp,
    Curl,
}

impl OptionalLibrary {
    pub const ALL: [Self; 3] = [Self::Blas, Self::OpenMp, Self::Curl];

    /// Module name queried with `pkg-config --modversion`.
    pub const fn pkg_config_name(self) -> &'static str {
        match self {
            Self::Blas => "openblas",
            Self::OpenMp => "openmp",
            Self::Curl => "libcurl",
        }
    }

    /// Well-known shared object locations checked when pkg-config has no entry.
    pub const fn fallback_paths(self) -> &'static [&'static str] {
        match self {
            Self::Blas => &[
                "/usr/lib/x86_64-linux-gnu/libopenblas.so",
                "/usr/lib/libopenblas.so",
            ],
            Self::OpenMp | Self::Curl => &[],
        }
    }

    /// Whether any fallback path exists below `root`.
    ///
    /// `root` is `/` in production; tests pass a temporary directory.
    pub fn fallback_present(self, root: &Path) -> bool {
        self.fallback_paths()
            .iter()
            .any(|path| root.join(path.trim_start_matches('/')).exists())
    }
}

impl fmt::Display for OptionalLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Blas => "BLAS",
            Self::OpenMp => "OpenMP",
            Self::Curl => "CURL",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_paths_resolve_under_root() {
        let root = tempfile::tempdir().unwrap();
        assert!(!OptionalLibrary::Blas.fallback_present(root.path()));

        let lib = root.path().join("usr/lib");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("libopenblas.so"), b"").unwrap();
        assert!(OptionalLibrary::Blas.fallback_present(root.path()));
    }

    #[test]
    fn test_only_blas_has_fallbacks() {
        assert!(OptionalLibrary::OpenMp.fallback_paths().is_empty());
        assert!(OptionalLibrary::Curl.fallback_paths().is_empty());
    }
}
