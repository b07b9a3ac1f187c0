//! `ggforge install`: resolve flags, then run the install pipeline.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use ggforge_core::{ForgeConfig, PlatformTag, Translator, paths, tables};
use ggforge_runtime::{InstallError, InstallPlan, plan_flags};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::logging::log_hardware_profile;
use crate::presentation::progress;
use crate::presentation::{BOLD, CYAN, GREEN, RED, RESET, YELLOW};

/// Install base from the configuration, or the working directory.
pub fn install_base(config: &ForgeConfig) -> Result<PathBuf, CliError> {
    let base = match &config.install_dir {
        Some(dir) => paths::normalize_user_path(&dir.to_string_lossy())?,
        None => paths::resolve_install_base(None)?,
    };
    Ok(base)
}

/// Explicit tag, else detection unless `no_auto`.
pub fn select_tag(ctx: &CliContext, no_auto: bool) -> Result<PlatformTag, CliError> {
    let t = &ctx.translator;
    match (ctx.config.hardware_override, no_auto) {
        (Some(tag), _) => Ok(tag),
        (None, false) => {
            let tag = ctx.detector.detect_platform_tag();
            println!(
                "{GREEN}{}{RESET}",
                t.t_with("auto_detected", &[("hardware_type", tag.as_str())])
            );
            Ok(tag)
        }
        (None, true) => {
            println!("{}", t.t("list_configs_hint"));
            Err(CliError::Arguments(t.t("select_hardware_type")))
        }
    }
}

pub async fn execute(ctx: &CliContext, no_auto: bool) -> Result<()> {
    let started = Instant::now();
    let t = &ctx.translator;
    info!("Running 'install'");

    let tag = select_tag(ctx, no_auto)?;
    let profile = ctx.detector.profile(Some(tag));
    log_hardware_profile(&profile);

    let base = install_base(&ctx.config)?;
    paths::ensure_directory(&base).map_err(|e| {
        let directory = base.display().to_string();
        let error = e.to_string();
        CliError::Io(t.t_with(
            "cannot_create_directory",
            &[("directory", directory.as_str()), ("error", error.as_str())],
        ))
    })?;

    let custom = ctx.config.custom_config.clone();
    if let Some(path) = &custom
        && !path.exists()
    {
        let shown = path.display().to_string();
        error!(path = %shown, "Flags file does not exist");
        let message = t.t_with("config_file_not_exists", &[("path", shown.as_str())]);
        return Err(CliError::Config(message).into());
    }

    info!(
        %tag,
        dir = %base.display(),
        custom = ?custom,
        auto = !no_auto,
        language = %t.language(),
        "Installation parameters"
    );

    let base_shown = base.display().to_string();
    println!(
        "{CYAN}{}{RESET}",
        t.t_with("installation_for", &[("hardware_type", tag.as_str())])
    );
    println!("{}: {tag}", t.t("hardware_type"));
    println!(
        "{}",
        t.t_with("installation_directory_label", &[("install_dir", base_shown.as_str())])
    );
    if let Some(path) = &custom {
        println!("{}: {}", t.t("config_option"), path.display());
    }
    // Synthesis, if any, runs inside the pipeline once dependencies are installed.
    let flags = plan_flags(tag, custom.as_deref(), &ctx.synthesizer()).map_err(CliError::from)?;
    let dependencies = tables::dependencies(tag);
    info!(dependencies = ?dependencies, "System dependencies");
    println!("{}", t.t("starting_installation"));

    let plan = InstallPlan {
        base_dir: base,
        tag,
        flags,
        dependencies,
        jobs: profile.physical_cores.max(1),
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(progress::drive(rx, *t, ctx.config.is_debug()));
    let result = ctx.installer().run(&plan, tx).await;
    let _ = renderer.await;

    let elapsed = started.elapsed().as_secs_f64();
    let seconds = format!("{elapsed:.1}");
    match result {
        Ok(outcome) => {
            info!(seconds = %seconds, "Installation finished");
            println!("{BOLD}{GREEN}{}{RESET}", t.t("installation_complete"));
            for wrapper in &outcome.wrappers {
                let path = wrapper.display().to_string();
                println!("  {}", t.t_with("run_hint", &[("path", path.as_str())]));
            }
            println!("{}", t.t_with("elapsed", &[("seconds", seconds.as_str())]));
            Ok(())
        }
        Err(e) => {
            error!(seconds = %seconds, error = %e, "Installation failed");
            if let InstallError::MissingDependencies { instructions, .. } = &e {
                print!("{}", render_instructions(instructions, t));
            } else {
                let message = e.to_string();
                println!(
                    "{BOLD}{RED}{}{RESET}",
                    t.t_with("installation_error", &[("error", message.as_str())])
                );
            }
            Err(CliError::from(e).into())
        }
    }
}

/// Manual install steps for missing packages.
pub fn render_instructions(instructions: &[String], t: &Translator) -> String {
    use std::fmt::Write as _;

    let listed_only = instructions.iter().all(|line| line.starts_with("  - "));
    let header = if listed_only {
        "unknown_package_manager"
    } else {
        "install_dependencies_manually"
    };

    let mut out = String::new();
    let _ = writeln!(out, "{BOLD}{RED}{}{RESET}", t.t("installation_interrupted"));
    let _ = writeln!(out, "{}", t.t("dependencies_not_installed"));
    let _ = writeln!(out, "{YELLOW}{}{RESET}", t.t(header));
    for line in instructions {
        let _ = writeln!(out, "{line}");
    }
    let _ = writeln!(out, "{}", t.t("run_installer_again"));
    out
}
