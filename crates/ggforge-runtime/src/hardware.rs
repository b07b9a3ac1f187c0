//! Host fingerprinting: which static table (if any) fits this machine.
//!
//! Detection order is Termux, then Raspberry Pi, then x86-64 Linux by vector
//! tier, then `unknown`. Every file read is resolved under an injectable root
//! and an unreadable file simply means "not that platform". The CPU
//! descriptor is read at most once per detector and reused for the run.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ggforge_core::ports::FixedCapabilities;
use ggforge_core::{
    CpuFeature, CpuFeatureSet, HardwareProfile, PlatformFacts, PlatformTag, RaspberryPiModel,
};
use sysinfo::System;
use tracing::{debug, info, warn};

use crate::probe::CpuInfoDetector;

const TERMUX_HOME: &str = "data/data/com.termux";
const DEVICE_TREE_MODEL: &str = "proc/device-tree/model";
const CPUINFO: &str = "proc/cpuinfo";

/// Facts read from OS APIs and the environment once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSnapshot {
    pub facts: PlatformFacts,
    pub os_release: String,
    pub memory_gb: u64,
    pub physical_cores: usize,
    pub logical_cores: usize,
    /// Value of `TERMUX_VERSION`, if set.
    pub termux_version: Option<String>,
    /// Value of `PREFIX`, empty if unset.
    pub prefix: String,
}

impl HostSnapshot {
    pub fn capture() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();

        let mut facts = PlatformFacts::current();
        if let Some(cpu) = sys.cpus().first() {
            facts.processor_label = cpu.brand().trim().to_string();
        }

        let logical_cores = num_cpus::get();
        Self {
            facts,
            os_release: System::kernel_version().unwrap_or_default(),
            memory_gb: round_gb(sys.total_memory()),
            physical_cores: num_cpus::get_physical().max(1),
            logical_cores,
            termux_version: std::env::var("TERMUX_VERSION").ok(),
            prefix: std::env::var("PREFIX").unwrap_or_default(),
        }
    }
}

/// Bytes to gigabytes, rounded to nearest.
fn round_gb(bytes: u64) -> u64 {
    const GIB: u64 = 1024 * 1024 * 1024;
    (bytes + GIB / 2) / GIB
}

pub struct HardwareDetector {
    root: PathBuf,
    host: HostSnapshot,
    cpuinfo: OnceLock<Option<String>>,
    features: OnceLock<CpuFeatureSet>,
}

impl HardwareDetector {
    /// Detector for the running machine.
    pub fn new() -> Self {
        Self::with_parts("/", HostSnapshot::capture())
    }

    /// Detector reading files under `root` with a prepared host snapshot.
    pub fn with_parts(root: impl Into<PathBuf>, host: HostSnapshot) -> Self {
        Self {
            root: root.into(),
            host,
            cpuinfo: OnceLock::new(),
            features: OnceLock::new(),
        }
    }

    pub const fn host(&self) -> &HostSnapshot {
        &self.host
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn cpuinfo(&self) -> Option<&str> {
        self.cpuinfo
            .get_or_init(|| CpuInfoDetector::at(self.path(CPUINFO)).read())
            .as_deref()
    }

    /// Feature claims, detected on first use and cached afterwards.
    pub fn cpu_features(&self) -> CpuFeatureSet {
        self.features
            .get_or_init(|| CpuInfoDetector::features(self.cpuinfo()))
            .clone()
    }

    /// Capability source for the synthesizer, fixed to the cached claims.
    pub fn capability_source(&self) -> FixedCapabilities {
        FixedCapabilities(self.cpu_features())
    }

    pub fn is_termux(&self) -> bool {
        let termux = self.host.termux_version.is_some()
            || self.path(TERMUX_HOME).exists()
            || self.host.prefix.contains("com.termux");
        debug!(termux, "Checked for Termux");
        termux
    }

    pub fn raspberry_pi(&self) -> Option<RaspberryPiModel> {
        if let Some(model) = read_text(&self.path(DEVICE_TREE_MODEL)) {
            let model = model.trim_matches(char::from(0)).trim();
            debug!(model, "Device tree model");
            if model.contains("Raspberry Pi 5") {
                return Some(RaspberryPiModel::Pi5);
            }
            if model.contains("Raspberry Pi 4") {
                return Some(RaspberryPiModel::Pi4);
            }
            if model.contains("Raspberry Pi") {
                return Some(RaspberryPiModel::Other);
            }
        }

        let cpuinfo = self.cpuinfo()?;
        if cpuinfo.contains("BCM2712") {
            Some(RaspberryPiModel::Pi5)
        } else if cpuinfo.contains("BCM2711") {
            Some(RaspberryPiModel::Pi4)
        } else if cpuinfo.contains("Hardware") && cpuinfo.contains("BCM") {
            Some(RaspberryPiModel::Other)
        } else {
            None
        }
    }

    pub fn detect_platform_tag(&self) -> PlatformTag {
        let tag = self.select_tag(self.raspberry_pi(), &self.cpu_features());
        info!(%tag, "Detected platform");
        tag
    }

    fn select_tag(&self, pi: Option<RaspberryPiModel>, features: &CpuFeatureSet) -> PlatformTag {
        if self.is_termux() {
            return PlatformTag::Termux;
        }

        match pi {
            Some(RaspberryPiModel::Pi5) => {
                debug!(memory_gb = self.host.memory_gb, "Raspberry Pi 5");
                return match self.host.memory_gb {
                    16.. => PlatformTag::Rpi5_16gb,
                    8.. => PlatformTag::Rpi5_8gb,
                    _ => PlatformTag::Rpi5_4gb,
                };
            }
            Some(RaspberryPiModel::Pi4) => return PlatformTag::Rpi4,
            Some(RaspberryPiModel::Other) => return PlatformTag::RpiOther,
            None => {}
        }

        if self.host.facts.is_x86_64_linux() {
            return if features.claims(CpuFeature::Avx2) {
                PlatformTag::X86Linux
            } else if features.claims(CpuFeature::Avx) {
                PlatformTag::X86LinuxOld
            } else {
                PlatformTag::X86LinuxMinimal
            };
        }

        warn!(
            os = %self.host.facts.operating_system,
            arch = %self.host.facts.machine_architecture,
            "No table matches this platform"
        );
        PlatformTag::Unknown
    }

    /// Full profile, using `tag` instead of detection when given.
    pub fn profile(&self, tag: Option<PlatformTag>) -> HardwareProfile {
        let features = self.cpu_features();
        let raspberry_pi = self.raspberry_pi();
        let tag = tag.unwrap_or_else(|| self.select_tag(raspberry_pi, &features));
        let x86 = self.host.facts.is_x86_64_linux();

        HardwareProfile {
            tag,
            facts: self.host.facts.clone(),
            os_release: self.host.os_release.clone(),
            physical_cores: self.host.physical_cores,
            logical_cores: self.host.logical_cores,
            memory_gb: self.host.memory_gb,
            has_avx: x86
                && (features.claims(CpuFeature::Avx) || features.claims(CpuFeature::Avx2)),
            has_avx2: x86 && features.claims(CpuFeature::Avx2),
            is_termux: self.is_termux(),
            raspberry_pi,
        }
    }
}

impl Default for HardwareDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn read_text(path: &Path) -> Option<String> {
    fs::read(path)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
