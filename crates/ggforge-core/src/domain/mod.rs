//! Domain types shared by the probing core, the static tables and the installer.

mod features;
mod flags;
mod library;
mod platform;
mod verdict;

pub use features::{CpuFeature, CpuFeatureSet};
pub use flags::{
    BASELINE_FLAGS, BLAS_PROVIDER, CandidateFlagSet, FeatureToggle, FinalConfig,
    blas_provider_flag, split_definition,
};
pub(crate) use flags::describe_tiers;
pub use library::OptionalLibrary;
pub use platform::{
    HardwareProfile, PlatformFacts, PlatformTag, RaspberryPiModel, UnknownPlatformTag,
};
pub use verdict::ProbeVerdict;
