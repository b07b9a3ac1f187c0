//! `ggforge probe`: run flag synthesis and show what it confirmed.

use anyhow::{Context, Result};
use ggforge_core::FinalConfig;
use tracing::info;

use crate::bootstrap::CliContext;
use crate::presentation::{BOLD, CYAN, GREEN, RESET, render_table, yes_no};

pub async fn execute(ctx: &CliContext) -> Result<()> {
    info!("Running 'probe'");
    let t = &ctx.translator;

    let features = ctx.detector.cpu_features();
    let rows: Vec<(String, String)> = features
        .report()
        .into_iter()
        .map(|(feature, claimed)| {
            (
                feature.label().to_string(),
                yes_no(claimed, &t.t("yes"), &t.t("no")),
            )
        })
        .collect();
    print!(
        "{}",
        render_table(&t.t("cpu_features"), (&t.t("property"), &t.t("value")), &rows)
    );
    println!();
    println!("{CYAN}{}{RESET}", t.t("probing"));

    let synthesizer = ctx.synthesizer();
    let config: FinalConfig = tokio::task::spawn_blocking(move || synthesizer.synthesize())
        .await
        .context("flag synthesis did not complete")?;

    println!();
    println!("{BOLD}{GREEN}{}:{RESET}", t.t("final_flags"));
    for flag in config.flags() {
        println!("  {flag}");
    }
    println!();
    println!("{BOLD}{}:{RESET} {}", t.t("probe_summary"), config.describe());
    Ok(())
}
