//! `ggforge list-configs`

use std::fmt::Write as _;

use anyhow::Result;
use ggforge_core::{PlatformTag, Translator, tables};

use crate::bootstrap::CliContext;
use crate::presentation::{BOLD, CYAN, RESET, truncated};

const SHOWN_FLAGS: usize = 3;
const SHOWN_DEPS: usize = 5;

pub fn execute(ctx: &CliContext) -> Result<()> {
    // Dynamic has no table; show what the detector claims instead of probing.
    let dynamic = ctx.synthesizer().describe_claims();
    for tag in PlatformTag::LISTED {
        print!("{}", render_entry(tag, &ctx.translator, &dynamic));
    }
    Ok(())
}

/// One configuration block.
pub fn render_entry(tag: PlatformTag, t: &Translator, dynamic_summary: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{BOLD}{CYAN}{tag}{RESET}");
    let _ = writeln!(out, "{}: {}", t.t("description"), tables::description(tag, t));

    let _ = writeln!(out, "{}:", t.t("cmake_flags_label"));
    if tag == PlatformTag::Dynamic {
        let _ = writeln!(out, "  {dynamic_summary}");
    } else {
        let flags = tables::static_flags(tag);
        let (shown, more) = truncated(&flags, SHOWN_FLAGS, |n| {
            t.t_with("more_flags", &[("count", n.to_string().as_str())])
        });
        for flag in shown {
            let _ = writeln!(out, "  {flag}");
        }
        if let Some(more) = more {
            let _ = writeln!(out, "  {more}");
        }
    }

    let _ = writeln!(out, "{}:", t.t("dependencies_label"));
    let deps = tables::dependencies(tag);
    let (shown, more) = truncated(&deps, SHOWN_DEPS, |n| {
        t.t_with("more_deps", &[("count", n.to_string().as_str())])
    });
    let _ = writeln!(out, "  {}", shown.join(", "));
    if let Some(more) = more {
        let _ = writeln!(out, "  {more}");
    }
    out
}
