//! Run configuration passed explicitly to every component.
//!
//! Precedence, lowest first: defaults, environment (`GGFORGE_*`), then
//! whatever the CLI overrides on the returned value.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

use crate::domain::PlatformTag;
use crate::i18n::{Language, Translator};

pub const ENV_LANG: &str = "GGFORGE_LANG";
pub const ENV_INSTALL_DIR: &str = "GGFORGE_INSTALL_DIR";
pub const ENV_PROBE_CONFIGURE_SECS: &str = "GGFORGE_PROBE_CONFIGURE_SECS";
pub const ENV_PROBE_BUILD_SECS: &str = "GGFORGE_PROBE_BUILD_SECS";
pub const ENV_PROBE_RUN_SECS: &str = "GGFORGE_PROBE_RUN_SECS";
pub const ENV_QUERY_SECS: &str = "GGFORGE_QUERY_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: invalid value '{value}': {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Per-step time limits for probes and package queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    pub configure: Duration,
    pub build: Duration,
    pub run: Duration,
    pub query: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            configure: Duration::from_secs(30),
            build: Duration::from_secs(60),
            run: Duration::from_secs(10),
            query: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeConfig {
    pub language: Language,
    pub log_level: Level,
    /// Install base directory; `None` means the working directory.
    pub install_dir: Option<PathBuf>,
    /// Flags file that replaces both static tables and probing.
    pub custom_config: Option<PathBuf>,
    pub probe_timeouts: ProbeTimeouts,
    /// Platform tag chosen by the user instead of detection.
    pub hardware_override: Option<PlatformTag>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            log_level: Level::INFO,
            install_dir: None,
            custom_config: None,
            probe_timeouts: ProbeTimeouts::default(),
            hardware_override: None,
        }
    }
}

impl ForgeConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_LANG) {
            config.language = value.parse().map_err(|e: crate::i18n::UnsupportedLanguage| {
                ConfigError::InvalidValue {
                    var: ENV_LANG,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(value) = lookup(ENV_INSTALL_DIR).filter(|v| !v.trim().is_empty()) {
            config.install_dir = Some(PathBuf::from(value));
        }

        let timeouts = &mut config.probe_timeouts;
        for (var, slot) in [
            (ENV_PROBE_CONFIGURE_SECS, &mut timeouts.configure),
            (ENV_PROBE_BUILD_SECS, &mut timeouts.build),
            (ENV_PROBE_RUN_SECS, &mut timeouts.run),
            (ENV_QUERY_SECS, &mut timeouts.query),
        ] {
            if let Some(value) = lookup(var) {
                *slot = parse_seconds(var, &value)?;
            }
        }

        Ok(config)
    }

    pub const fn translator(&self) -> Translator {
        Translator::new(self.language)
    }

    pub fn is_debug(&self) -> bool {
        self.log_level >= Level::DEBUG
    }
}

fn parse_seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| invalid("expected a whole number of seconds"))?;
    if secs == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ForgeConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ForgeConfig::default());
        assert_eq!(config.probe_timeouts.configure, Duration::from_secs(30));
        assert_eq!(config.probe_timeouts.build, Duration::from_secs(60));
        assert_eq!(config.probe_timeouts.run, Duration::from_secs(10));
        assert_eq!(config.probe_timeouts.query, Duration::from_secs(5));
        assert!(!config.is_debug());
    }

    #[test]
    fn test_env_overrides() {
        let config = ForgeConfig::from_lookup(lookup_from(&[
            (ENV_LANG, "pl"),
            (ENV_INSTALL_DIR, "/srv/llama"),
            (ENV_PROBE_BUILD_SECS, "120"),
        ]))
        .unwrap();
        assert_eq!(config.language, Language::Pl);
        assert_eq!(config.install_dir, Some(PathBuf::from("/srv/llama")));
        assert_eq!(config.probe_timeouts.build, Duration::from_secs(120));
        assert_eq!(config.probe_timeouts.run, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_timeout_names_variable() {
        let err = ForgeConfig::from_lookup(lookup_from(&[(ENV_PROBE_RUN_SECS, "soon")]))
            .unwrap_err();
        assert!(err.to_string().starts_with(ENV_PROBE_RUN_SECS));

        let err = ForgeConfig::from_lookup(lookup_from(&[(ENV_QUERY_SECS, "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_invalid_language() {
        let err = ForgeConfig::from_lookup(lookup_from(&[(ENV_LANG, "fr")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: ENV_LANG, .. }));
    }
}
