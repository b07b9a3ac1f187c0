//! Host platform facts and the closed set of platform tags.
//!
//! `PlatformFacts` is produced once at startup by the hardware detector and is
//! read-only for the rest of the run. `PlatformTag` keys the static flag and
//! dependency tables; every lookup is an exhaustive `match` so adding a tag
//! forces every table to be updated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable description of the host, gathered from platform APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFacts {
    /// Operating system name (e.g. "Linux").
    pub operating_system: String,
    /// Machine architecture (e.g. "x86_64", "aarch64").
    pub machine_architecture: String,
    /// Processor label as reported by the OS, may be empty.
    pub processor_label: String,
    /// Pointer width label (e.g. "64bit").
    pub word_size: String,
}

impl PlatformFacts {
    /// Facts for the running process, without a processor label.
    ///
    /// Adapters that can read the CPU brand should fill `processor_label` in.
    pub fn current() -> Self {
        Self {
            operating_system: os_display_name(std::env::consts::OS).to_string(),
            machine_architecture: std::env::consts::ARCH.to_string(),
            processor_label: String::new(),
            word_size: format!("{}bit", usize::BITS),
        }
    }

    /// Whether this is Linux on a 64-bit x86 machine.
    pub fn is_x86_64_linux(&self) -> bool {
        self.operating_system.eq_ignore_ascii_case("linux")
            && matches!(
                self.machine_architecture.to_ascii_lowercase().as_str(),
                "x86_64" | "amd64"
            )
    }
}

fn os_display_name(os: &str) -> &str {
    match os {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        "android" => "Android",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

/// Raspberry Pi board generation detected from the device tree or cpuinfo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaspberryPiModel {
    Pi5,
    Pi4,
    Other,
}

/// Everything the install pipeline needs to know about the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareProfile {
    /// Platform tag selected for this host.
    pub tag: PlatformTag,
    /// Raw platform facts.
    pub facts: PlatformFacts,
    /// Kernel release string, empty when unknown.
    pub os_release: String,
    /// Physical core count (falls back to logical count).
    pub physical_cores: usize,
    /// Logical core count.
    pub logical_cores: usize,
    /// Total memory rounded to whole gigabytes.
    pub memory_gb: u64,
    /// Whether the CPU advertises AVX.
    pub has_avx: bool,
    /// Whether the CPU advertises AVX2.
    pub has_avx2: bool,
    /// Running inside Termux on Android.
    pub is_termux: bool,
    /// Raspberry Pi generation, if this is one.
    pub raspberry_pi: Option<RaspberryPiModel>,
}

/// Closed set of platform identifiers understood by the static tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformTag {
    /// Flags are discovered by probing instead of looked up.
    Dynamic,
    #[serde(rename = "rpi5_8gb")]
    Rpi5_8gb,
    #[serde(rename = "rpi5_16gb")]
    Rpi5_16gb,
    #[serde(rename = "rpi5_4gb")]
    Rpi5_4gb,
    Rpi4,
    RpiOther,
    Termux,
    X86Linux,
    X86LinuxOld,
    X86LinuxMinimal,
    NoOptimization,
    /// Detection could not classify the host.
    Unknown,
}

impl PlatformTag {
    /// Tags listed by `list-configs`, in display order.
    pub const LISTED: [Self; 11] = [
        Self::Dynamic,
        Self::Rpi5_8gb,
        Self::Rpi5_16gb,
        Self::Rpi5_4gb,
        Self::Rpi4,
        Self::RpiOther,
        Self::Termux,
        Self::X86Linux,
        Self::X86LinuxOld,
        Self::X86LinuxMinimal,
        Self::NoOptimization,
    ];

    /// The snake_case identifier used on the command line and in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::Rpi5_8gb => "rpi5_8gb",
            Self::Rpi5_16gb => "rpi5_16gb",
            Self::Rpi5_4gb => "rpi5_4gb",
            Self::Rpi4 => "rpi4",
            Self::RpiOther => "rpi_other",
            Self::Termux => "termux",
            Self::X86Linux => "x86_linux",
            Self::X86LinuxOld => "x86_linux_old",
            Self::X86LinuxMinimal => "x86_linux_minimal",
            Self::NoOptimization => "no_optimization",
            Self::Unknown => "unknown",
        }
    }

    pub const fn is_raspberry_pi(self) -> bool {
        matches!(
            self,
            Self::Rpi5_8gb | Self::Rpi5_16gb | Self::Rpi5_4gb | Self::Rpi4 | Self::RpiOther
        )
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A platform tag string that is not in the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown hardware type '{0}' (run 'ggforge list-configs' to see the options)")]
pub struct UnknownPlatformTag(pub String);

impl FromStr for PlatformTag {
    type Err = UnknownPlatformTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::LISTED
            .iter()
            .chain(std::iter::once(&Self::Unknown))
            .copied()
            .find(|tag| tag.as_str() == needle)
            .ok_or_else(|| UnknownPlatformTag(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trips_through_str() {
        for tag in PlatformTag::LISTED {
            assert_eq!(tag.as_str().parse::<PlatformTag>().unwrap(), tag);
        }
        assert_eq!("unknown".parse::<PlatformTag>().unwrap(), PlatformTag::Unknown);
    }

    #[test]
    fn test_tag_parse_is_case_insensitive() {
        assert_eq!("X86_Linux".parse::<PlatformTag>().unwrap(), PlatformTag::X86Linux);
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = "pentium_pro".parse::<PlatformTag>().unwrap_err();
        assert!(err.to_string().contains("pentium_pro"));
    }

    #[test]
    fn test_serde_uses_cli_identifiers() {
        let json = serde_json::to_string(&PlatformTag::Rpi5_8gb).unwrap();
        assert_eq!(json, "\"rpi5_8gb\"");
        let json = serde_json::to_string(&PlatformTag::X86LinuxOld).unwrap();
        assert_eq!(json, "\"x86_linux_old\"");
    }

    #[test]
    fn test_x86_64_linux_detection() {
        let facts = PlatformFacts {
            operating_system: "Linux".to_string(),
            machine_architecture: "AMD64".to_string(),
            processor_label: String::new(),
            word_size: "64bit".to_string(),
        };
        assert!(facts.is_x86_64_linux());

        let arm = PlatformFacts {
            machine_architecture: "aarch64".to_string(),
            ..facts
        };
        assert!(!arm.is_x86_64_linux());
    }
}
