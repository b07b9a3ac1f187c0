use std::path::PathBuf;

use ggforge_core::ports::CapabilitySource;
use ggforge_core::CpuFeatureSet;
use tracing::{debug, warn};

/// Reads CPU flag claims from `/proc/cpuinfo`.
///
/// The file exists only on Linux; anywhere else (or on any read error) the
/// detector claims nothing.
#[derive(Debug, Clone)]
pub struct CpuInfoDetector {
    path: PathBuf,
}

impl Default for CpuInfoDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuInfoDetector {
    pub fn new() -> Self {
        Self::at("/proc/cpuinfo")
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Raw descriptor text, or `None` when it cannot be read.
    pub fn read(&self) -> Option<String> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read CPU features, assuming none");
                None
            }
        }
    }

    /// Claims found in previously read descriptor text.
    pub fn features(text: Option<&str>) -> CpuFeatureSet {
        let set = text.map_or_else(CpuFeatureSet::none, CpuFeatureSet::from_descriptor);
        debug!(features = ?set, "Detected CPU features");
        set
    }
}

impl CapabilitySource for CpuInfoDetector {
    fn detect(&self) -> CpuFeatureSet {
        Self::features(self.read().as_deref())
    }
}
