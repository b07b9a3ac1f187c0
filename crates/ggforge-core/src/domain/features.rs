//! CPU instruction-set claims read from the hardware descriptor.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Instruction-set extensions the detector knows how to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuFeature {
    Avx,
    Avx2,
    Fma,
    #[serde(rename = "sse4_1")]
    Sse41,
    #[serde(rename = "sse4_2")]
    Sse42,
    F16c,
    Bmi2,
}

impl CpuFeature {
    pub const ALL: [Self; 7] = [
        Self::Avx,
        Self::Avx2,
        Self::Fma,
        Self::Sse41,
        Self::Sse42,
        Self::F16c,
        Self::Bmi2,
    ];

    /// Canonical lowercase token searched for in the descriptor text.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Avx => "avx",
            Self::Avx2 => "avx2",
            Self::Fma => "fma",
            Self::Sse41 => "sse4_1",
            Self::Sse42 => "sse4_2",
            Self::F16c => "f16c",
            Self::Bmi2 => "bmi2",
        }
    }

    /// Uppercase label for display.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Avx => "AVX",
            Self::Avx2 => "AVX2",
            Self::Fma => "FMA",
            Self::Sse41 => "SSE4_1",
            Self::Sse42 => "SSE4_2",
            Self::F16c => "F16C",
            Self::Bmi2 => "BMI2",
        }
    }
}

impl fmt::Display for CpuFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Set of features the hardware descriptor claims.
///
/// A claim is only a hint: the synthesizer still confirms each one with a
/// probe build before enabling it. An empty set is the safe default whenever
/// the descriptor cannot be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuFeatureSet {
    claimed: BTreeSet<CpuFeature>,
}

impl CpuFeatureSet {
    /// A set with every feature unclaimed.
    pub fn none() -> Self {
        Self::default()
    }

    /// Scan descriptor text for every known token, ignoring case.
    pub fn from_descriptor(text: &str) -> Self {
        let haystack = text.to_lowercase();
        let claimed = CpuFeature::ALL
            .into_iter()
            .filter(|feature| haystack.contains(feature.token()))
            .collect();
        Self { claimed }
    }

    /// Builder used by adapters and tests that already know the answer.
    #[must_use]
    pub fn with(mut self, feature: CpuFeature) -> Self {
        self.claimed.insert(feature);
        self
    }

    pub fn claims(&self, feature: CpuFeature) -> bool {
        self.claimed.contains(&feature)
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// Claimed features in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = CpuFeature> + '_ {
        self.claimed.iter().copied()
    }

    /// Summary of what a dynamic build would aim for, without probing.
    pub fn describe_claims(&self) -> String {
        let mut tiers = Vec::new();
        if self.claims(CpuFeature::Avx2) {
            tiers.push("AVX2");
        } else if self.claims(CpuFeature::Avx) {
            tiers.push("AVX");
        }
        if self.claims(CpuFeature::Fma) {
            tiers.push("FMA");
        }
        super::describe_tiers(&tiers)
    }

    /// `(feature, claimed)` pairs for every known feature, for tables.
    pub fn report(&self) -> Vec<(CpuFeature, bool)> {
        CpuFeature::ALL
            .into_iter()
            .map(|feature| (feature, self.claims(feature)))
            .collect()
    }
}

impl FromIterator<CpuFeature> for CpuFeatureSet {
    fn from_iter<I: IntoIterator<Item = CpuFeature>>(iter: I) -> Self {
        Self {
            claimed: iter.into_iter().collect(),
        }
    }
}
