//! CMake configure and compile steps with progress tracking.

use std::path::Path;

use ggforge_core::InstallStage;
use ggforge_core::i18n::Translator;
use tracing::info;

use super::error::{InstallError, InstallResult};
use super::report::Reporter;
use super::stream::run_streamed;

/// Substrings that make a configure line worth showing.
const CONFIGURE_KEYWORDS: [&str; 7] = [
    "found",
    "not found",
    "enabled",
    "disabled",
    "configuring",
    "generating",
    "build files",
];

fn is_notable_configure_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    CONFIGURE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

fn is_notable_compile_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    line.contains("Building")
        || line.contains("Linking")
        || lower.contains("error")
        || lower.contains("warning:")
        || lower.contains("fatal")
        || lower.contains("undefined reference")
}

/// Run `cmake -B <build> -S <source> <flags>` in a fresh build directory.
pub(crate) async fn configure(
    source_dir: &Path,
    build_dir: &Path,
    flags: &[String],
    reporter: &mut Reporter,
    translator: &Translator,
) -> InstallResult<()> {
    if !source_dir.is_dir() {
        return Err(InstallError::SourceMissing(source_dir.to_path_buf()));
    }
    if build_dir.exists() {
        tokio::fs::remove_dir_all(build_dir).await?;
    }
    tokio::fs::create_dir_all(build_dir).await?;

    let stage = InstallStage::Configure;
    reporter.progress(stage, 0, translator.t("configuring_build"));
    info!(flags = ?flags, "Configuring build");

    let mut args = vec![
        "-B".to_string(),
        build_dir.display().to_string(),
        "-S".to_string(),
        source_dir.display().to_string(),
    ];
    args.extend(flags.iter().cloned());

    let mut seen = 0u8;
    let code = run_streamed("cmake", &args, None, |line| {
        if is_notable_configure_line(line) {
            seen = seen.saturating_add(1).min(95);
            reporter.progress(stage, seen, format!("CMAKE: {line}"));
        }
        reporter.output(stage, line);
    })
    .await?;

    if code != Some(0) {
        return Err(InstallError::ConfigureFailed { code });
    }
    reporter.progress(stage, 100, translator.t("configure_complete"));
    Ok(())
}

/// Run `cmake --build <build> --config Release -j <jobs>`.
pub(crate) async fn compile(
    build_dir: &Path,
    jobs: usize,
    reporter: &mut Reporter,
    translator: &Translator,
) -> InstallResult<()> {
    let stage = InstallStage::Compile;
    let jobs = jobs.max(1).to_string();
    reporter.progress(
        stage,
        0,
        translator.t_with("starting_compilation", &[("cores", jobs.as_str())]),
    );

    let build = build_dir.display().to_string();
    let args = ["--build", build.as_str(), "--config", "Release", "-j", jobs.as_str()];

    let mut last_progress = 0;
    let mut total_files = 100;
    let code = run_streamed("cmake", args, None, |line| {
        if let Some(progress) = parse_build_progress(line, &mut total_files)
            && progress > last_progress
        {
            last_progress = progress;
            reporter.progress(stage, fraction(progress, total_files), format!("MAKE: {line}"));
        } else if is_notable_compile_line(line) {
            reporter.progress(stage, fraction(last_progress, total_files), format!("MAKE: {line}"));
        }
        reporter.output(stage, line);
    })
    .await?;

    if code != Some(0) {
        return Err(InstallError::CompileFailed { code });
    }
    reporter.progress(stage, 100, translator.t("compilation_complete"));
    Ok(())
}

/// `done` out of `total` as a 0-100 fraction.
fn fraction(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    u8::try_from(done.min(total) * 100 / total).unwrap_or(100)
}

/// Parse build progress from `CMake` output.
///
/// Understands the Makefile generator's `[ 50%]` and Ninja's `[150/200]`.
fn parse_build_progress(line: &str, total_files: &mut usize) -> Option<usize> {
    if let Some(start) = line.find('[')
        && let Some(end) = line[start..].find(']')
    {
        let bracket_content = &line[start + 1..start + end];

        if let Some(pct_pos) = bracket_content.find('%')
            && let Ok(percent) = bracket_content[..pct_pos].trim().parse::<usize>()
        {
            *total_files = 100;
            return Some(percent);
        }

        if let Some(slash_pos) = bracket_content.find('/') {
            let current = bracket_content[..slash_pos].trim().parse::<usize>().ok()?;
            let total = bracket_content[slash_pos + 1..]
                .trim()
                .parse::<usize>()
                .ok()?;
            *total_files = total;
            return Some(current);
        }
    }

    None
}
