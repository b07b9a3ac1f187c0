//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;
use ggforge_core::Language;

use crate::commands::Commands;

/// Command-line interface for the llama.cpp build tool.
///
/// Global options apply to every subcommand and override the matching
/// `GGFORGE_*` environment variables.
#[derive(Parser)]
#[command(name = "ggforge")]
#[command(about = "Build llama.cpp with compiler flags tuned to this machine")]
#[command(version)]
pub struct Cli {
    /// Interface language (en or pl)
    #[arg(short = 'l', long = "lang", global = true)]
    pub lang: Option<Language>,

    /// Enable debug logging
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::CommandFactory;
    use ggforge_core::PlatformTag;

    use super::*;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["ggforge", "detect", "--lang", "pl", "--debug"]);
        assert_eq!(cli.lang, Some(Language::Pl));
        assert!(cli.debug);
        assert!(matches!(cli.command, Some(Commands::Detect)));
    }

    #[test]
    fn test_install_args() {
        let cli = Cli::parse_from([
            "ggforge",
            "install",
            "--hardware",
            "rpi5_8gb",
            "--dir",
            "~/llama",
            "--config",
            "flags.txt",
            "--no-auto",
        ]);
        match cli.command {
            Some(Commands::Install {
                hardware,
                dir,
                config,
                no_auto,
            }) => {
                assert_eq!(hardware, Some(PlatformTag::Rpi5_8gb));
                assert_eq!(dir.as_deref(), Some("~/llama"));
                assert_eq!(config, Some(PathBuf::from("flags.txt")));
                assert!(no_auto);
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_create_config_defaults_to_x86() {
        let cli = Cli::parse_from(["ggforge", "create-config", "mine.txt"]);
        match cli.command {
            Some(Commands::CreateConfig { output, hardware }) => {
                assert_eq!(output, PathBuf::from("mine.txt"));
                assert_eq!(hardware, PlatformTag::X86Linux);
            }
            _ => panic!("expected create-config"),
        }
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(Cli::try_parse_from(["ggforge", "--lang", "de", "detect"]).is_err());
        assert!(Cli::try_parse_from(["ggforge", "install", "--hardware", "pdp11"]).is_err());
    }
}
