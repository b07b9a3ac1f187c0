//! The install pipeline: dependencies, fetch, configure, compile, wrap.
//!
//! Progress goes out as [`InstallEvent`]s over an unbounded channel. The
//! percentage never decreases and each stage owns a fixed slice of 0-100.
//! On failure a [`InstallEvent::Failed`] naming the stage is sent before the
//! error is returned.

mod build;
mod deps;
mod error;
mod fetch;
mod record;
mod report;
mod stream;
mod wrap;

use std::path::PathBuf;

use ggforge_core::i18n::Translator;
use ggforge_core::{FinalConfig, InstallEvent, InstallStage, PlatformTag, paths, tables};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

pub use deps::{DependencyChecker, PackageManager};
pub use error::{InstallError, InstallResult};
pub use fetch::REPOSITORY_URL;
pub use record::BuildRecord;
pub use wrap::WRAPPED_EXECUTABLES;

use crate::resolve::{FlagPlan, FlagSource};
use report::Reporter;

/// Everything decided before the pipeline starts.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    /// Install base; the checkout goes into `<base>/llama.cpp`.
    pub base_dir: PathBuf,
    pub tag: PlatformTag,
    /// Settled after the dependency and fetch stages.
    pub flags: FlagPlan,
    /// Packages that must be present before building.
    pub dependencies: Vec<String>,
    /// Parallel compile jobs.
    pub jobs: usize,
}

/// What a successful install left on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub source_dir: PathBuf,
    pub wrappers: Vec<PathBuf>,
    pub record_path: PathBuf,
    /// Flags the build was configured with.
    pub flags: Vec<String>,
    pub flag_source: FlagSource,
}

pub struct Installer {
    checker: DependencyChecker,
    translator: Translator,
    repository: String,
}

impl Installer {
    pub fn new(checker: DependencyChecker, translator: Translator) -> Self {
        Self {
            checker,
            translator,
            repository: REPOSITORY_URL.to_string(),
        }
    }

    /// Clone from `url` instead of the upstream repository.
    #[must_use]
    pub fn with_repository(mut self, url: impl Into<String>) -> Self {
        self.repository = url.into();
        self
    }

    /// Run every stage in order.
    pub async fn run(
        &self,
        plan: &InstallPlan,
        events: UnboundedSender<InstallEvent>,
    ) -> InstallResult<InstallOutcome> {
        let mut reporter = Reporter::new(events);
        let mut stage = InstallStage::Dependencies;
        info!(
            base = %plan.base_dir.display(),
            tag = %plan.tag,
            source = plan.flags.source().as_str(),
            "Starting installation"
        );

        match self.stages(plan, &mut reporter, &mut stage).await {
            Ok(outcome) => {
                info!(source_dir = %outcome.source_dir.display(), "Installation complete");
                reporter.send(InstallEvent::Completed {
                    source_dir: outcome.source_dir.clone(),
                    wrappers: outcome.wrappers.clone(),
                });
                Ok(outcome)
            }
            Err(e) => {
                error!(%stage, error = %e, "Installation failed");
                reporter.send(InstallEvent::Failed {
                    stage,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn stages(
        &self,
        plan: &InstallPlan,
        reporter: &mut Reporter,
        stage: &mut InstallStage,
    ) -> InstallResult<InstallOutcome> {
        let t = &self.translator;
        paths::ensure_directory(&plan.base_dir)?;
        let source_dir = paths::source_dir(&plan.base_dir);
        let build_dir = paths::build_dir(&plan.base_dir);

        *stage = InstallStage::Dependencies;
        self.dependencies(plan, reporter).await?;

        *stage = InstallStage::Fetch;
        fetch::fetch_sources(&self.repository, &source_dir, reporter, t).await?;

        *stage = InstallStage::Configure;
        let (flags, flag_source, description) = self.settle_flags(plan, reporter).await?;
        build::configure(&source_dir, &build_dir, &flags, reporter, t).await?;

        *stage = InstallStage::Compile;
        build::compile(&build_dir, plan.jobs, reporter, t).await?;

        *stage = InstallStage::Wrap;
        reporter.progress(*stage, 0, t.t("creating_wrapper_scripts"));
        let wrappers = wrap::create_wrappers(&source_dir)?;
        if wrappers.is_empty() {
            reporter.progress(*stage, 50, t.t("no_executables"));
        }
        for wrapper in &wrappers {
            let path = wrapper.display().to_string();
            reporter.progress(*stage, 50, t.t_with("wrapper_created", &[("path", path.as_str())]));
        }

        let record = BuildRecord::new(
            plan.tag,
            flag_source,
            flags.clone(),
            description,
            record::current_commit(&source_dir).await,
        );
        let record_path = paths::build_record_path(&plan.base_dir);
        if let Err(e) = record.save(&record_path) {
            warn!(path = %record_path.display(), error = %e, "Could not write build record");
        }
        reporter.progress(*stage, 100, t.t("installation_complete"));

        Ok(InstallOutcome {
            source_dir,
            wrappers,
            record_path,
            flags,
            flag_source,
        })
    }

    /// Final flags and their summary.
    ///
    /// Synthesis happens here rather than up front so its trial builds run
    /// against the toolchain the dependency stage installed.
    async fn settle_flags(
        &self,
        plan: &InstallPlan,
        reporter: &mut Reporter,
    ) -> InstallResult<(Vec<String>, FlagSource, String)> {
        let t = &self.translator;
        let pending = plan.flags.clone();
        if matches!(pending, FlagPlan::Synthesize(_)) {
            reporter.progress(InstallStage::Configure, 0, t.t("probing"));
        }
        let (flags, source) = tokio::task::spawn_blocking(move || pending.resolve()).await?;

        let description = match source {
            FlagSource::Synthesized => FinalConfig::from(flags.clone()).describe(),
            FlagSource::Custom | FlagSource::Static => tables::description(plan.tag, t),
        };
        info!(flags = ?flags, source = source.as_str(), "Compilation flags");
        reporter.send(InstallEvent::FlagsResolved {
            flags: flags.clone(),
            source: source.as_str().to_string(),
            description: description.clone(),
        });
        Ok((flags, source, description))
    }

    async fn dependencies(&self, plan: &InstallPlan, reporter: &mut Reporter) -> InstallResult<()> {
        let t = &self.translator;
        let stage = InstallStage::Dependencies;
        reporter.progress(stage, 0, t.t("checking_dependencies"));

        let missing = self.checker.missing(&plan.dependencies);
        if missing.is_empty() {
            reporter.progress(stage, 100, t.t("dependencies_ok"));
            return Ok(());
        }
        let listed = missing.join(", ");
        reporter.progress(
            stage,
            30,
            t.t_with("missing_dependencies", &[("deps", listed.as_str())]),
        );

        if plan.tag != PlatformTag::Termux {
            let instructions = self.checker.package_manager().instructions(&missing);
            return Err(InstallError::MissingDependencies {
                missing,
                instructions,
            });
        }

        reporter.progress(stage, 50, t.t("installing_dependencies"));
        let mut args = vec!["install".to_string(), "-y".to_string()];
        args.extend(missing.iter().cloned());
        let code = stream::run_streamed("pkg", &args, None, |line| reporter.output(stage, line)).await?;
        if code != Some(0) {
            return Err(InstallError::DependencyInstallFailed {
                command: format!("pkg {}", args.join(" ")),
                code,
            });
        }
        reporter.progress(stage, 100, t.t("dependencies_ok"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use ggforge_core::ports::{
        CommandError, CommandExecutor, CommandOutput, CommandSpec, DependencyProbe, FeatureProbe,
    };
    use ggforge_core::{
        CpuFeature, CpuFeatureSet, FixedCapabilities, Language, OptionalLibrary, ProbeVerdict,
    };
    use tokio::sync::mpsc;

    use super::*;
    use crate::synth::ConfigSynthesizer;

    #[derive(Default)]
    struct CountingProbe {
        trials: AtomicUsize,
    }

    impl FeatureProbe for CountingProbe {
        fn probe(&self, _flags: &[String]) -> ProbeVerdict {
            self.trials.fetch_add(1, Ordering::SeqCst);
            ProbeVerdict::Passed
        }
    }

    impl DependencyProbe for CountingProbe {
        fn is_available(&self, _library: OptionalLibrary) -> bool {
            self.trials.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    struct NoDpkg;

    impl CommandExecutor for NoDpkg {
        fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
            Err(CommandError::Spawn {
                program: spec.program_name(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    fn installer(root: &std::path::Path) -> Installer {
        let checker = DependencyChecker::new(Arc::new(NoDpkg), Duration::from_secs(1))
            .with_search_path(root.join("empty-bin"))
            .with_root(root);
        Installer::new(checker, Translator::new(Language::En))
    }

    fn plan(base: PathBuf, tag: PlatformTag) -> InstallPlan {
        InstallPlan {
            base_dir: base,
            tag,
            flags: FlagPlan::Ready {
                flags: vec!["-DCMAKE_BUILD_TYPE=Release".to_string()],
                source: FlagSource::Static,
            },
            dependencies: vec!["git".to_string(), "libomp-dev".to_string()],
            jobs: 2,
        }
    }

    #[tokio::test]
    async fn test_missing_dependencies_stop_the_pipeline() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("etc/apt")).unwrap();
        std::fs::write(root.path().join("etc/apt/sources.list"), "").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let err = installer(root.path())
            .run(&plan(root.path().join("base"), PlatformTag::X86Linux), tx)
            .await
            .unwrap_err();

        match err {
            InstallError::MissingDependencies {
                missing,
                instructions,
            } => {
                assert_eq!(missing, vec!["git", "libomp-dev"]);
                assert_eq!(instructions[1], "sudo apt install -y git libomp-dev");
            }
            other => panic!("unexpected error: {other}"),
        }

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(matches!(
            events.last(),
            Some(InstallEvent::Failed {
                stage: InstallStage::Dependencies,
                ..
            })
        ));

        let percents: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                InstallEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert!(percents.iter().all(|p| *p <= 10));
        assert!(!root.path().join("base").join("llama.cpp").exists());
    }

    #[tokio::test]
    async fn test_missing_dependencies_skip_synthesis() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("etc/apt")).unwrap();
        std::fs::write(root.path().join("etc/apt/sources.list"), "").unwrap();

        let probe = Arc::new(CountingProbe::default());
        let synth = ConfigSynthesizer::new(
            Arc::new(FixedCapabilities(
                CpuFeatureSet::none().with(CpuFeature::Avx2),
            )),
            probe.clone(),
            probe.clone(),
        );
        let mut plan = plan(root.path().join("base"), PlatformTag::Dynamic);
        plan.flags = FlagPlan::Synthesize(synth);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let err = installer(root.path()).run(&plan, tx).await.unwrap_err();

        assert!(matches!(err, InstallError::MissingDependencies { .. }));
        assert_eq!(probe.trials.load(Ordering::SeqCst), 0);
        while let Ok(event) = rx.try_recv() {
            assert!(!matches!(event, InstallEvent::FlagsResolved { .. }));
        }
    }

    #[tokio::test]
    async fn test_unwritable_base_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("not-a-dir");
        std::fs::write(&file, "").unwrap();

        let (tx, _rx) = mpsc::unbounded_channel();
        let err = installer(root.path())
            .run(&plan(file, PlatformTag::X86Linux), tx)
            .await
            .unwrap_err();
        assert!(matches!(err, InstallError::Path(_)));
    }
}
