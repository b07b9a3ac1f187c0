use std::path::Path;

use ggforge_core::InstallStage;
use ggforge_core::i18n::Translator;
use tracing::info;

use super::error::{InstallError, InstallResult};
use super::report::Reporter;
use super::stream::run_streamed;

pub const REPOSITORY_URL: &str = "https://github.com/ggerganov/llama.cpp.git";

/// Last `NN%` in a git progress line, e.g. `Receiving objects:  42% (420/1000)`.
fn git_percent(line: &str) -> Option<u8> {
    let pct = line.rfind('%')?;
    let digits_start = line[..pct]
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    line[digits_start..pct].parse::<u8>().ok().filter(|p| *p <= 100)
}

/// Shallow-clone the sources into `source_dir`, replacing any previous
/// checkout.
pub(crate) async fn fetch_sources(
    url: &str,
    source_dir: &Path,
    reporter: &mut Reporter,
    translator: &Translator,
) -> InstallResult<()> {
    let stage = InstallStage::Fetch;
    reporter.progress(stage, 0, translator.t("downloading_llama"));

    if source_dir.exists() {
        info!(path = %source_dir.display(), "Removing previous checkout");
        tokio::fs::remove_dir_all(source_dir).await?;
    }

    let target = source_dir.display().to_string();
    let args = ["clone", "--depth=1", "--progress", url, target.as_str()];
    let code = run_streamed("git", args, None, |line| {
        // Receiving objects is the bulk of a clone; other phases are brief.
        if line.starts_with("Receiving objects")
            && let Some(percent) = git_percent(line)
        {
            reporter.progress(stage, percent.min(95), line);
        }
        reporter.output(stage, line);
    })
    .await?;

    if code != Some(0) {
        return Err(InstallError::FetchFailed { code });
    }
    reporter.progress(
        stage,
        100,
        translator.t_with("downloaded_to", &[("path", target.as_str())]),
    );
    Ok(())
}
