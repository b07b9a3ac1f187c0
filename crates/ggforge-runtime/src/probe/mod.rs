//! Adapters for the probing ports.

mod capability;
mod dependency;
mod feature;
mod workspace;

pub use capability::CpuInfoDetector;
pub use dependency::PkgConfigDependencyProbe;
pub use feature::CmakeFeatureProbe;
