//! `ggforge detect`

use anyhow::Result;
use ggforge_core::{HardwareProfile, PlatformTag, Translator, tables};
use tracing::info;

use crate::bootstrap::CliContext;
use crate::logging::log_hardware_profile;
use crate::presentation::{BOLD, GREEN, RESET, render_table};

pub fn execute(ctx: &CliContext) -> Result<()> {
    info!("Running 'detect'");
    let t = &ctx.translator;
    let profile = ctx.detector.profile(None);
    log_hardware_profile(&profile);

    print!(
        "{}",
        render_table(
            &t.t("hardware_info_table"),
            (&t.t("property"), &t.t("value")),
            &hardware_rows(&profile, t),
        )
    );
    println!();
    println!("{BOLD}{GREEN}{}:{RESET}", t.t("suggested_optimizations"));
    println!("{}", tables::description(profile.tag, t));
    Ok(())
}

/// Rows of the hardware table; AVX rows only for x86 tags.
pub fn hardware_rows(profile: &HardwareProfile, t: &Translator) -> Vec<(String, String)> {
    let yes_no = |v: bool| if v { t.t("yes") } else { t.t("no") };
    let mut rows = vec![
        (t.t("hardware_type"), profile.tag.to_string()),
        (
            t.t("system"),
            format!("{} {}", profile.facts.operating_system, profile.os_release)
                .trim()
                .to_string(),
        ),
        (t.t("architecture"), profile.facts.machine_architecture.clone()),
    ];
    if !profile.facts.processor_label.is_empty() {
        rows.push((t.t("processor"), profile.facts.processor_label.clone()));
    }
    rows.extend([
        (t.t("ram_memory"), format!("{} GB", profile.memory_gb)),
        (t.t("physical_cores"), profile.physical_cores.to_string()),
        (t.t("logical_cores"), profile.logical_cores.to_string()),
    ]);
    if matches!(
        profile.tag,
        PlatformTag::X86Linux | PlatformTag::X86LinuxOld | PlatformTag::X86LinuxMinimal
    ) {
        rows.push((t.t("avx_support"), yes_no(profile.has_avx)));
        rows.push((t.t("avx2_support"), yes_no(profile.has_avx2)));
    }
    rows
}
