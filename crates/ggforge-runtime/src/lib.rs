//! OS-facing adapters for ggforge.
//!
//! This crate implements the ports from `ggforge-core`: the timeout-bounded
//! [`SystemCommandExecutor`], the capability, feature and dependency probes,
//! the [`ConfigSynthesizer`] that combines them, host fingerprinting and the
//! async install pipeline.

#![deny(unsafe_code)]

mod command;
pub mod hardware;
pub mod install;
pub mod probe;
mod resolve;
mod synth;

pub use command::SystemCommandExecutor;
pub use hardware::{HardwareDetector, HostSnapshot};
pub use install::{
    BuildRecord, DependencyChecker, InstallError, InstallOutcome, InstallPlan, InstallResult,
    Installer, PackageManager,
};
pub use probe::{CmakeFeatureProbe, CpuInfoDetector, PkgConfigDependencyProbe};
pub use resolve::{FlagPlan, FlagSource, plan_flags, resolve_flags};
pub use synth::ConfigSynthesizer;
