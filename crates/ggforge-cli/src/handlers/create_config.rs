//! `ggforge create-config <OUTPUT> [--type TAG]`

use std::path::Path;

use anyhow::Result;
use ggforge_core::{PlatformTag, Translator, tables};
use tracing::info;

use crate::error::CliError;
use crate::presentation::{GREEN, RESET};

pub fn execute(output: &Path, tag: PlatformTag, t: &Translator) -> Result<()> {
    let hint = output.display().to_string();
    let content = tables::render_config_template(tag, &hint, t);
    std::fs::write(output, content).map_err(|e| {
        CliError::Io(t.t_with("file_creation_error", &[("error", e.to_string().as_str())]))
    })?;
    info!(path = %hint, %tag, "Wrote flags template");

    println!("{GREEN}{}{RESET}", t.t_with("config_created", &[("path", hint.as_str())]));
    println!("{}", t.t_with("config_usage", &[("path", hint.as_str())]));
    Ok(())
}
