//! Core domain for ggforge: platform and CPU facts, the build-flag vocabulary,
//! static per-platform tables and the ports implemented by `ggforge-runtime`.
//!
//! Nothing in this crate spawns processes or probes the host.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod events;
pub mod i18n;
pub mod paths;
pub mod ports;
pub mod tables;

pub use config::{ConfigError, ForgeConfig, ProbeTimeouts};
pub use domain::{
    BASELINE_FLAGS, BLAS_PROVIDER, CandidateFlagSet, CpuFeature, CpuFeatureSet, FeatureToggle,
    FinalConfig, HardwareProfile, OptionalLibrary, PlatformFacts, PlatformTag, ProbeVerdict,
    RaspberryPiModel, UnknownPlatformTag, blas_provider_flag, split_definition,
};
pub use events::{InstallEvent, InstallStage, ProgressTracker};
pub use i18n::{Language, Translator, UnsupportedLanguage};
pub use paths::PathError;
pub use ports::{
    CapabilitySource, CommandError, CommandExecutor, CommandOutput, CommandSpec, DependencyProbe,
    FeatureProbe, FixedCapabilities,
};
pub use tables::CustomConfigError;
