//! Port definitions (trait abstractions) for the outside world.
//!
//! Core owns the traits; `ggforge-runtime` owns the implementations that
//! spawn processes and read system files. The CLI wires them together.

pub mod command;
pub mod probe;

pub use command::{CommandError, CommandExecutor, CommandOutput, CommandSpec};
pub use probe::{CapabilitySource, DependencyProbe, FeatureProbe, FixedCapabilities};
