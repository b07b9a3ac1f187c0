use std::fmt;
use std::path::Path;

use ggforge_core::tables::{load_custom_flags, static_flags};
use ggforge_core::{CustomConfigError, PlatformTag};
use tracing::info;

use crate::synth::ConfigSynthesizer;

/// Where a resolved flag list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSource {
    Custom,
    Synthesized,
    Static,
}

impl FlagSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Synthesized => "synthesized",
            Self::Static => "static",
        }
    }
}

/// Flags for the configure step, possibly not yet synthesized.
///
/// Synthesis runs trial builds, so it has to wait until the build toolchain
/// is installed.
#[derive(Clone)]
pub enum FlagPlan {
    /// Read from a custom file or a static table.
    Ready {
        flags: Vec<String>,
        source: FlagSource,
    },
    /// Synthesized when [`FlagPlan::resolve`] is called.
    Synthesize(ConfigSynthesizer),
}

impl fmt::Debug for FlagPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready { flags, source } => f
                .debug_struct("Ready")
                .field("flags", flags)
                .field("source", source)
                .finish(),
            Self::Synthesize(_) => f.write_str("Synthesize"),
        }
    }
}

impl FlagPlan {
    pub const fn source(&self) -> FlagSource {
        match self {
            Self::Ready { source, .. } => *source,
            Self::Synthesize(_) => FlagSource::Synthesized,
        }
    }

    /// Final flag list. Blocks for the whole synthesis when one is pending.
    pub fn resolve(self) -> (Vec<String>, FlagSource) {
        match self {
            Self::Ready { flags, source } => (flags, source),
            Self::Synthesize(synthesizer) => {
                (synthesizer.synthesize().into_flags(), FlagSource::Synthesized)
            }
        }
    }
}

/// Decide where the flags come from without running any trial build.
///
/// A custom flags file wins over everything. Otherwise `dynamic` defers to
/// the synthesizer and every other tag reads its static table.
pub fn plan_flags(
    tag: PlatformTag,
    custom: Option<&Path>,
    synthesizer: &ConfigSynthesizer,
) -> Result<FlagPlan, CustomConfigError> {
    if let Some(path) = custom {
        let flags = load_custom_flags(path)?;
        info!(path = %path.display(), count = flags.len(), "Using custom flags");
        return Ok(FlagPlan::Ready {
            flags,
            source: FlagSource::Custom,
        });
    }

    if tag == PlatformTag::Dynamic {
        info!("Flags will be synthesized after dependencies are in place");
        return Ok(FlagPlan::Synthesize(synthesizer.clone()));
    }

    let flags = static_flags(tag);
    info!(%tag, count = flags.len(), "Using static flags");
    Ok(FlagPlan::Ready {
        flags,
        source: FlagSource::Static,
    })
}

/// Flag list handed to the configure step, synthesizing immediately if needed.
pub fn resolve_flags(
    tag: PlatformTag,
    custom: Option<&Path>,
    synthesizer: &ConfigSynthesizer,
) -> Result<(Vec<String>, FlagSource), CustomConfigError> {
    plan_flags(tag, custom, synthesizer).map(FlagPlan::resolve)
}
