//! Build flag vocabulary and the accumulated flag list produced by synthesis.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Flags asserted unconditionally before any probing.
pub const BASELINE_FLAGS: [&str; 3] = [
    "-DCMAKE_BUILD_TYPE=Release",
    "-DGGML_CUDA=OFF",
    "-DGGML_NATIVE=OFF",
];

/// BLAS vendor tried first when a BLAS library is present.
pub const BLAS_PROVIDER: &str = "OpenBLAS";

/// Every toggle that must resolve to an explicit ON or OFF in a final config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureToggle {
    VectorBase,
    VectorExtended,
    FusedMultiplyAdd,
    BitManipulation,
    HalfPrecision,
    MathBackend,
    ParallelRuntime,
    HttpClient,
    LinkTimeOptimization,
}

impl FeatureToggle {
    pub const ALL: [Self; 9] = [
        Self::VectorBase,
        Self::VectorExtended,
        Self::FusedMultiplyAdd,
        Self::BitManipulation,
        Self::HalfPrecision,
        Self::MathBackend,
        Self::ParallelRuntime,
        Self::HttpClient,
        Self::LinkTimeOptimization,
    ];

    /// CMake cache variable controlled by this toggle.
    pub const fn cmake_name(self) -> &'static str {
        match self {
            Self::VectorBase => "GGML_AVX",
            Self::VectorExtended => "GGML_AVX2",
            Self::FusedMultiplyAdd => "GGML_FMA",
            Self::BitManipulation => "GGML_BMI2",
            Self::HalfPrecision => "GGML_F16C",
            Self::MathBackend => "GGML_BLAS",
            Self::ParallelRuntime => "GGML_OPENMP",
            Self::HttpClient => "LLAMA_CURL",
            Self::LinkTimeOptimization => "GGML_LTO",
        }
    }

    /// `-D<NAME>=ON` or `-D<NAME>=OFF`.
    pub fn flag(self, enabled: bool) -> String {
        format!("-D{}={}", self.cmake_name(), if enabled { "ON" } else { "OFF" })
    }
}

impl fmt::Display for FeatureToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cmake_name())
    }
}

/// `-DGGML_BLAS_PROVIDER=<vendor>`.
pub fn blas_provider_flag(provider: &str) -> String {
    format!("-DGGML_BLAS_PROVIDER={provider}")
}

/// Split a `-DNAME=VALUE` flag into its name and value.
///
/// A definition without `=` is treated as `ON`. Flags that are not
/// definitions (e.g. `-G Ninja`) yield `None`.
pub fn split_definition(flag: &str) -> Option<(&str, &str)> {
    let body = flag.strip_prefix("-D")?;
    match body.split_once('=') {
        Some((name, value)) => Some((name, value)),
        None => Some((body, "ON")),
    }
}

/// Flags accumulated while synthesis runs.
///
/// Starts with the baseline and only grows. Probe candidates are built with
/// [`CandidateFlagSet::trial`] without touching the accepted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFlagSet {
    flags: Vec<String>,
}

impl Default for CandidateFlagSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateFlagSet {
    pub fn new() -> Self {
        Self {
            flags: BASELINE_FLAGS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Accepted flags followed by `extra`, for handing to a probe.
    pub fn trial(&self, extra: &[String]) -> Vec<String> {
        self.flags.iter().chain(extra).cloned().collect()
    }

    /// Append confirmed (or explicitly disabled) flags.
    pub fn accept<I>(&mut self, flags: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.flags.extend(flags);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.flags
    }

    pub fn finish(self) -> FinalConfig {
        FinalConfig { flags: self.flags }
    }
}

/// Confirmed flag list handed verbatim to the configure step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalConfig {
    flags: Vec<String>,
}

impl FinalConfig {
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn into_flags(self) -> Vec<String> {
        self.flags
    }

    /// Explicit state of a toggle, `None` if the flag is absent.
    pub fn toggle_state(&self, toggle: FeatureToggle) -> Option<bool> {
        self.flags
            .iter()
            .filter_map(|flag| split_definition(flag))
            .find(|(name, _)| *name == toggle.cmake_name())
            .map(|(_, value)| value.eq_ignore_ascii_case("ON"))
    }

    /// Number of flags that set `toggle`, enabled or not.
    pub fn occurrences(&self, toggle: FeatureToggle) -> usize {
        self.flags
            .iter()
            .filter_map(|flag| split_definition(flag))
            .filter(|(name, _)| *name == toggle.cmake_name())
            .count()
    }

    /// Short summary of the accepted tiers, for display only.
    pub fn describe(&self) -> String {
        let enabled = |toggle| self.toggle_state(toggle) == Some(true);
        let mut tiers = Vec::new();
        if enabled(FeatureToggle::VectorExtended) {
            tiers.push("AVX2");
        } else if enabled(FeatureToggle::VectorBase) {
            tiers.push("AVX");
        }
        if enabled(FeatureToggle::FusedMultiplyAdd) {
            tiers.push("FMA");
        }
        if enabled(FeatureToggle::MathBackend) {
            tiers.push("BLAS");
        }
        if enabled(FeatureToggle::ParallelRuntime) {
            tiers.push("OpenMP");
        }
        describe_tiers(&tiers)
    }
}

pub(crate) fn describe_tiers(tiers: &[&str]) -> String {
    if tiers.is_empty() {
        "Dynamically optimized (safe compatibility mode)".to_string()
    } else {
        format!("Dynamically optimized for {}", tiers.join("+"))
    }
}

impl From<Vec<String>> for FinalConfig {
    fn from(flags: Vec<String>) -> Self {
        Self { flags }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flag_shape() {
        assert_eq!(FeatureToggle::VectorExtended.flag(true), "-DGGML_AVX2=ON");
        assert_eq!(FeatureToggle::HttpClient.flag(false), "-DLLAMA_CURL=OFF");
    }

    #[test]
    fn test_split_definition() {
        assert_eq!(split_definition("-DGGML_FMA=ON"), Some(("GGML_FMA", "ON")));
        assert_eq!(
            split_definition("-DCMAKE_C_FLAGS=-O2 -mtune=x"),
            Some(("CMAKE_C_FLAGS", "-O2 -mtune=x"))
        );
        assert_eq!(split_definition("-DGGML_RPC"), Some(("GGML_RPC", "ON")));
        assert_eq!(split_definition("--fresh"), None);
    }

    #[test]
    fn test_candidate_starts_with_baseline() {
        let candidate = CandidateFlagSet::new();
        assert_eq!(candidate.as_slice(), BASELINE_FLAGS);
    }

    #[test]
    fn test_trial_does_not_mutate() {
        let candidate = CandidateFlagSet::new();
        let trial = candidate.trial(&[FeatureToggle::FusedMultiplyAdd.flag(true)]);
        assert_eq!(trial.len(), BASELINE_FLAGS.len() + 1);
        assert_eq!(candidate.as_slice().len(), BASELINE_FLAGS.len());
    }

    #[test]
    fn test_toggle_state_and_describe() {
        let mut candidate = CandidateFlagSet::new();
        candidate.accept([
            FeatureToggle::VectorBase.flag(true),
            FeatureToggle::VectorExtended.flag(false),
            FeatureToggle::FusedMultiplyAdd.flag(true),
        ]);
        let config = candidate.finish();

        assert_eq!(config.toggle_state(FeatureToggle::VectorBase), Some(true));
        assert_eq!(config.toggle_state(FeatureToggle::VectorExtended), Some(false));
        assert_eq!(config.toggle_state(FeatureToggle::LinkTimeOptimization), None);
        assert_eq!(config.describe(), "Dynamically optimized for AVX+FMA");
    }

    #[test]
    fn test_describe_baseline_only() {
        let config = CandidateFlagSet::new().finish();
        assert_eq!(
            config.describe(),
            "Dynamically optimized (safe compatibility mode)"
        );
    }
}
