//! Probing ports consumed by the config synthesizer.
//!
//! None of these return errors. Failure to measure is itself an answer:
//! an unreadable descriptor claims nothing, a failed build rejects the
//! candidate, a failed query reports the library as absent.

use crate::domain::{CpuFeatureSet, OptionalLibrary, ProbeVerdict};

/// Source of CPU instruction-set claims.
pub trait CapabilitySource: Send + Sync {
    fn detect(&self) -> CpuFeatureSet;
}

/// Confirms a candidate flag list with a configure, build and run trial.
pub trait FeatureProbe: Send + Sync {
    fn probe(&self, flags: &[String]) -> ProbeVerdict;
}

/// Reports whether an optional library is present and linkable.
pub trait DependencyProbe: Send + Sync {
    fn is_available(&self, library: OptionalLibrary) -> bool;
}

/// A capability source with a fixed answer.
///
/// Used when the feature set was already detected earlier in the run.
#[derive(Debug, Clone, Default)]
pub struct FixedCapabilities(pub CpuFeatureSet);

impl CapabilitySource for FixedCapabilities {
    fn detect(&self) -> CpuFeatureSet {
        self.0.clone()
    }
}
