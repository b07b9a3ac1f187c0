//! Subcommands of the `ggforge` binary.

use std::path::PathBuf;

use clap::Subcommand;
use ggforge_core::PlatformTag;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Detect the hardware type and show suggested optimizations
    Detect,

    /// Probe the compiler and CPU, then print the confirmed build flags
    Probe,

    /// List every hardware configuration with its flags and dependencies
    ListConfigs,

    /// Fetch, configure and compile llama.cpp for this machine
    Install {
        /// Hardware type (see `list-configs`)
        #[arg(long = "hardware")]
        hardware: Option<PlatformTag>,

        /// Installation directory (defaults to the working directory)
        #[arg(short = 'd', long = "dir")]
        dir: Option<String>,

        /// File with custom CMake flags, one per line
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Require --hardware instead of detecting it
        #[arg(long = "no-auto")]
        no_auto: bool,
    },

    /// Write a flags file template for a hardware type
    CreateConfig {
        /// File to create
        output: PathBuf,

        /// Hardware type whose flags seed the template
        #[arg(short = 't', long = "type", default_value = "x86_linux")]
        hardware: PlatformTag,
    },
}
