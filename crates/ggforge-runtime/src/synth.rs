//! Dynamic flag synthesis.
//!
//! Walks a fixed sequence of steps, each resolving one or more toggles to an
//! explicit ON or OFF. Steps never influence each other beyond the accepted
//! flags they contribute to later trial builds.

use std::sync::Arc;

use ggforge_core::ports::{CapabilitySource, DependencyProbe, FeatureProbe};
use ggforge_core::{
    BLAS_PROVIDER, CandidateFlagSet, CpuFeature, CpuFeatureSet, FeatureToggle, FinalConfig,
    OptionalLibrary, blas_provider_flag,
};
use tracing::{debug, info};

/// Builds a [`FinalConfig`] by confirming each capability with a probe.
#[derive(Clone)]
pub struct ConfigSynthesizer {
    capabilities: Arc<dyn CapabilitySource>,
    features: Arc<dyn FeatureProbe>,
    dependencies: Arc<dyn DependencyProbe>,
}

impl ConfigSynthesizer {
    pub fn new(
        capabilities: Arc<dyn CapabilitySource>,
        features: Arc<dyn FeatureProbe>,
        dependencies: Arc<dyn DependencyProbe>,
    ) -> Self {
        Self {
            capabilities,
            features,
            dependencies,
        }
    }

    /// Run every step and return the fully specified flag list.
    ///
    /// Never fails: an environment where nothing can be measured yields the
    /// baseline plus every toggle explicitly disabled.
    pub fn synthesize(&self) -> FinalConfig {
        let claims = self.capabilities.detect();
        info!(features = ?claims, "Synthesizing build flags");

        let mut candidate = CandidateFlagSet::new();
        self.vector_tiers(&claims, &mut candidate);
        for (feature, toggle) in [
            (CpuFeature::Fma, FeatureToggle::FusedMultiplyAdd),
            (CpuFeature::Bmi2, FeatureToggle::BitManipulation),
            (CpuFeature::F16c, FeatureToggle::HalfPrecision),
        ] {
            self.instruction(&claims, feature, toggle, &mut candidate);
        }
        self.math_backend(&mut candidate);
        self.library(OptionalLibrary::OpenMp, FeatureToggle::ParallelRuntime, &mut candidate);
        self.library(OptionalLibrary::Curl, FeatureToggle::HttpClient, &mut candidate);
        self.link_time_optimization(&mut candidate);

        let config = candidate.finish();
        info!(flags = ?config.flags(), "Synthesis finished");
        config
    }

    /// Pre-probe estimate of the tier from detector claims alone.
    ///
    /// The tier actually chosen is [`FinalConfig::describe`] on the result of
    /// [`Self::synthesize`].
    pub fn describe_claims(&self) -> String {
        self.capabilities.detect().describe_claims()
    }

    fn passes(&self, candidate: &CandidateFlagSet, extra: &[String]) -> bool {
        let trial = candidate.trial(extra);
        let verdict = self.features.probe(&trial);
        debug!(extra = ?extra, %verdict, "Trial build");
        verdict.is_passed()
    }

    fn vector_tiers(&self, claims: &CpuFeatureSet, candidate: &mut CandidateFlagSet) {
        let base = FeatureToggle::VectorBase;
        let extended = FeatureToggle::VectorExtended;

        if claims.claims(CpuFeature::Avx2) {
            let both = [base.flag(true), extended.flag(true)];
            if self.passes(candidate, &both) {
                info!("Vector tier: AVX2");
                candidate.accept(both);
                return;
            }
        }
        if claims.claims(CpuFeature::Avx) || claims.claims(CpuFeature::Avx2) {
            let base_only = [base.flag(true), extended.flag(false)];
            if self.passes(candidate, &base_only) {
                info!("Vector tier: AVX");
                candidate.accept(base_only);
                return;
            }
        }
        info!("Vector tier: none");
        candidate.accept([base.flag(false), extended.flag(false)]);
    }

    fn instruction(
        &self,
        claims: &CpuFeatureSet,
        feature: CpuFeature,
        toggle: FeatureToggle,
        candidate: &mut CandidateFlagSet,
    ) {
        let enabled = claims.claims(feature) && self.passes(candidate, &[toggle.flag(true)]);
        info!(%feature, enabled, "Instruction set decided");
        candidate.accept([toggle.flag(enabled)]);
    }

    fn math_backend(&self, candidate: &mut CandidateFlagSet) {
        let toggle = FeatureToggle::MathBackend;
        if self.dependencies.is_available(OptionalLibrary::Blas) {
            let with_provider = [toggle.flag(true), blas_provider_flag(BLAS_PROVIDER)];
            if self.passes(candidate, &with_provider) {
                info!(provider = BLAS_PROVIDER, "Math backend enabled");
                candidate.accept(with_provider);
                return;
            }
            let generic = [toggle.flag(true)];
            if self.passes(candidate, &generic) {
                info!("Math backend enabled without a specific provider");
                candidate.accept(generic);
                return;
            }
        }
        info!("Math backend disabled");
        candidate.accept([toggle.flag(false)]);
    }

    fn library(
        &self,
        library: OptionalLibrary,
        toggle: FeatureToggle,
        candidate: &mut CandidateFlagSet,
    ) {
        let enabled = self.dependencies.is_available(library)
            && self.passes(candidate, &[toggle.flag(true)]);
        info!(%library, enabled, "Library decided");
        candidate.accept([toggle.flag(enabled)]);
    }

    fn link_time_optimization(&self, candidate: &mut CandidateFlagSet) {
        let toggle = FeatureToggle::LinkTimeOptimization;
        let enabled = self.passes(candidate, &[toggle.flag(true)]);
        info!(enabled, "Link-time optimization decided");
        candidate.accept([toggle.flag(enabled)]);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use ggforge_core::{BASELINE_FLAGS, FixedCapabilities, ProbeVerdict};

    use super::*;

    /// Passes a trial unless its last flag is in `reject`; records every trial.
    #[derive(Default)]
    struct RecordingProbe {
        reject: HashSet<String>,
        trials: Mutex<Vec<Vec<String>>>,
    }

    impl FeatureProbe for RecordingProbe {
        fn probe(&self, flags: &[String]) -> ProbeVerdict {
            self.trials.lock().unwrap().push(flags.to_vec());
            match flags.last() {
                Some(last) if self.reject.contains(last) => ProbeVerdict::BuildFailed,
                _ => ProbeVerdict::Passed,
            }
        }
    }

    struct Libraries(Vec<OptionalLibrary>);

    impl DependencyProbe for Libraries {
        fn is_available(&self, library: OptionalLibrary) -> bool {
            self.0.contains(&library)
        }
    }

    fn synthesizer(
        claims: CpuFeatureSet,
        probe: Arc<RecordingProbe>,
        libraries: Vec<OptionalLibrary>,
    ) -> ConfigSynthesizer {
        ConfigSynthesizer::new(
            Arc::new(FixedCapabilities(claims)),
            probe,
            Arc::new(Libraries(libraries)),
        )
    }

    #[test]
    fn test_everything_claimed_and_passing() {
        let claims = CpuFeature::ALL.into_iter().collect();
        let probe = Arc::new(RecordingProbe::default());
        let config = synthesizer(claims, probe, OptionalLibrary::ALL.to_vec()).synthesize();

        assert_eq!(&config.flags()[..3], BASELINE_FLAGS);
        for toggle in FeatureToggle::ALL {
            assert_eq!(config.toggle_state(toggle), Some(true), "{toggle}");
            assert_eq!(config.occurrences(toggle), 1, "{toggle}");
        }
        assert!(config.flags().contains(&"-DGGML_BLAS_PROVIDER=OpenBLAS".to_string()));
        assert_eq!(config.describe(), "Dynamically optimized for AVX2+FMA+BLAS+OpenMP");
    }

    #[test]
    fn test_trials_carry_accepted_flags() {
        let claims = CpuFeatureSet::none().with(CpuFeature::Avx).with(CpuFeature::Fma);
        let probe = Arc::new(RecordingProbe::default());
        synthesizer(claims, probe.clone(), Vec::new()).synthesize();

        let trials = probe.trials.lock().unwrap();
        // AVX base tier, then FMA, then LTO.
        assert_eq!(trials.len(), 3);
        assert!(trials[1].contains(&"-DGGML_AVX=ON".to_string()));
        assert_eq!(trials[1].last().unwrap(), "-DGGML_FMA=ON");
        assert!(trials[2].contains(&"-DGGML_FMA=ON".to_string()));
    }

    #[test]
    fn test_blas_falls_back_to_generic() {
        let probe = Arc::new(RecordingProbe {
            reject: HashSet::from(["-DGGML_BLAS_PROVIDER=OpenBLAS".to_string()]),
            ..RecordingProbe::default()
        });
        let config = synthesizer(
            CpuFeatureSet::none(),
            probe,
            vec![OptionalLibrary::Blas],
        )
        .synthesize();

        assert_eq!(config.toggle_state(FeatureToggle::MathBackend), Some(true));
        assert!(!config.flags().iter().any(|f| f.contains("BLAS_PROVIDER")));
    }

    #[test]
    fn test_rejected_library_is_disabled() {
        let probe = Arc::new(RecordingProbe {
            reject: HashSet::from(["-DGGML_OPENMP=ON".to_string()]),
            ..RecordingProbe::default()
        });
        let config = synthesizer(
            CpuFeatureSet::none(),
            probe,
            vec![OptionalLibrary::OpenMp, OptionalLibrary::Curl],
        )
        .synthesize();

        assert_eq!(config.toggle_state(FeatureToggle::ParallelRuntime), Some(false));
        assert_eq!(config.toggle_state(FeatureToggle::HttpClient), Some(true));
    }

    #[test]
    fn test_describe_does_not_probe() {
        let claims = CpuFeatureSet::none().with(CpuFeature::Avx2).with(CpuFeature::Fma);
        let probe = Arc::new(RecordingProbe::default());
        let synth = synthesizer(claims, probe.clone(), Vec::new());

        assert_eq!(synth.describe_claims(), "Dynamically optimized for AVX2+FMA");
        assert!(probe.trials.lock().unwrap().is_empty());
    }
}
