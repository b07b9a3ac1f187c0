//! CLI bootstrap - the composition root.
//!
//! This is the only place the CLI constructs adapters from `ggforge-runtime`.
//! Handlers receive a [`CliContext`] and ask it for a synthesizer or an
//! installer instead of building their own.

use std::sync::Arc;

use ggforge_core::ports::CommandExecutor;
use ggforge_core::{ForgeConfig, Translator, paths};
use ggforge_runtime::{
    CmakeFeatureProbe, ConfigSynthesizer, DependencyChecker, HardwareDetector, Installer,
    PkgConfigDependencyProbe, SystemCommandExecutor,
};
use tracing::Level;

use crate::commands::Commands;
use crate::error::CliError;
use crate::parser::Cli;

/// Environment overlaid with the command-line flags.
pub fn load_config(cli: &Cli) -> Result<ForgeConfig, CliError> {
    let config = ForgeConfig::from_env()?;
    apply_overrides(config, cli)
}

/// Apply command-line flags on top of `config`.
pub fn apply_overrides(mut config: ForgeConfig, cli: &Cli) -> Result<ForgeConfig, CliError> {
    if let Some(language) = cli.lang {
        config.language = language;
    }
    if cli.debug {
        config.log_level = Level::DEBUG;
    }
    if let Some(Commands::Install {
        hardware,
        dir,
        config: custom,
        ..
    }) = &cli.command
    {
        if let Some(dir) = dir {
            config.install_dir = Some(paths::normalize_user_path(dir)?);
        }
        if let Some(custom) = custom {
            config.custom_config = Some(custom.clone());
        }
        if hardware.is_some() {
            config.hardware_override = *hardware;
        }
    }
    Ok(config)
}

/// Fully composed context for command handlers.
pub struct CliContext {
    pub config: ForgeConfig,
    pub translator: Translator,
    pub executor: Arc<dyn CommandExecutor>,
    pub detector: HardwareDetector,
}

impl CliContext {
    /// Synthesizer wired to the real cmake and pkg-config.
    pub fn synthesizer(&self) -> ConfigSynthesizer {
        let timeouts = self.config.probe_timeouts;
        ConfigSynthesizer::new(
            Arc::new(self.detector.capability_source()),
            Arc::new(CmakeFeatureProbe::new(self.executor.clone(), timeouts)),
            Arc::new(PkgConfigDependencyProbe::new(
                self.executor.clone(),
                timeouts.query,
            )),
        )
    }

    pub fn installer(&self) -> Installer {
        let checker =
            DependencyChecker::new(self.executor.clone(), self.config.probe_timeouts.query);
        Installer::new(checker, self.translator)
    }
}

/// Bootstrap the CLI context from a resolved configuration.
pub fn bootstrap(config: ForgeConfig) -> CliContext {
    let translator = config.translator();
    CliContext {
        config,
        translator,
        executor: Arc::new(SystemCommandExecutor::new()),
        detector: HardwareDetector::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use ggforge_core::{Language, PlatformTag};

    use super::*;

    #[test]
    fn test_flags_override_environment() {
        let env = ForgeConfig::from_lookup(|key| match key {
            "GGFORGE_LANG" => Some("pl".to_string()),
            "GGFORGE_INSTALL_DIR" => Some("/srv/from-env".to_string()),
            _ => None,
        })
        .unwrap();

        let cli = Cli::parse_from([
            "ggforge",
            "--lang",
            "en",
            "--debug",
            "install",
            "--dir",
            "/opt/llama",
            "--hardware",
            "termux",
            "--config",
            "/tmp/flags.txt",
        ]);
        let config = apply_overrides(env, &cli).unwrap();

        assert_eq!(config.language, Language::En);
        assert!(config.is_debug());
        assert_eq!(config.install_dir, Some(PathBuf::from("/opt/llama")));
        assert_eq!(config.hardware_override, Some(PlatformTag::Termux));
        assert_eq!(config.custom_config, Some(PathBuf::from("/tmp/flags.txt")));
    }

    #[test]
    fn test_environment_kept_without_flags() {
        let env = ForgeConfig::from_lookup(|key| {
            (key == "GGFORGE_INSTALL_DIR").then(|| "/srv/from-env".to_string())
        })
        .unwrap();
        let cli = Cli::parse_from(["ggforge", "install"]);
        let config = apply_overrides(env, &cli).unwrap();

        assert_eq!(config.install_dir, Some(PathBuf::from("/srv/from-env")));
        assert_eq!(config.hardware_override, None);
        assert!(!config.is_debug());
    }
}
