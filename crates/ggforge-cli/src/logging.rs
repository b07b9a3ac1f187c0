//! Tracing setup for the CLI.
//!
//! Console output goes to stderr so command output on stdout stays clean.
//! `install` additionally writes a daily-rotated plain-text log under
//! `<install_dir>/logs`.

use std::path::Path;

use ggforge_core::{HardwareProfile, paths};
use ggforge_runtime::HostSnapshot;
use tracing::{Level, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// File prefix of the rolling log, e.g. `ggforge.log.2025-01-31`.
pub const LOG_FILE_PREFIX: &str = "ggforge.log";

const RULE: &str = "============================================================";

/// Keeps the file writer alive; drop it only when the command is done.
#[must_use = "dropping the guard stops the file writer"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Filter from `RUST_LOG`, or `level` when it is unset or invalid.
pub fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()))
}

/// Install the global subscriber.
///
/// With `log_dir` a non-ANSI file layer is added. A directory that cannot be
/// created only drops the file layer.
pub fn init_tracing(level: Level, log_dir: Option<&Path>) -> LogGuard {
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .compact();

    let (file, guard) = match log_dir {
        Some(dir) => match paths::ensure_directory(dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .compact();
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!("Failed to create log directory: {e}");
                (None, None)
            }
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console)
        .with(file)
        .try_init()
        .ok();

    if let Some(dir) = log_dir.filter(|_| guard.is_some()) {
        info!(dir = %dir.display(), "Logging to file");
    }
    LogGuard { _file: guard }
}

/// Session header written once per run.
pub fn log_session_header(host: &HostSnapshot) {
    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let argv: Vec<String> = std::env::args().collect();

    info!("{RULE}");
    info!("Starting ggforge session");
    info!("{RULE}");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("System: {} {}", host.facts.operating_system, host.os_release);
    info!("Architecture: {}", host.facts.machine_architecture);
    info!("Processor: {}", host.facts.processor_label);
    info!("Memory: {} GB", host.memory_gb);
    info!("Working directory: {cwd}");
    info!("Arguments: {argv:?}");
    info!("{RULE}");
}

pub fn log_hardware_profile(profile: &HardwareProfile) {
    info!(
        tag = %profile.tag,
        system = %profile.facts.operating_system,
        arch = %profile.facts.machine_architecture,
        memory_gb = profile.memory_gb,
        physical_cores = profile.physical_cores,
        logical_cores = profile.logical_cores,
        avx = profile.has_avx,
        avx2 = profile.has_avx2,
        termux = profile.is_termux,
        raspberry_pi = ?profile.raspberry_pi,
        "Hardware detected"
    );
}
