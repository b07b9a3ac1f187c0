//! Launcher scripts placed next to the checkout.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Executables that get a `<name>.sh` wrapper when the build produced them.
pub const WRAPPED_EXECUTABLES: [&str; 3] = ["llama-cli", "llama-server", "llama-simple"];

fn wrapper_script(name: &str, relative: &Path) -> String {
    format!(
        "#!/bin/bash\n\
         # Wrapper script for {name}\n\
         cd \"$(dirname \"$0\")\"\n\
         exec \"./{}\" \"$@\"\n",
        relative.display()
    )
}

/// Write wrappers into `source_dir` for every executable found under
/// `build/bin` (or `build` when there is no `bin`).
///
/// Returns the wrappers written; an empty list means the build produced none
/// of the expected executables.
pub(crate) fn create_wrappers(source_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let build_dir = source_dir.join("build");
    let bin_dir = build_dir.join("bin");
    let bin_dir = if bin_dir.is_dir() { bin_dir } else { build_dir };

    let mut written = Vec::new();
    for name in WRAPPED_EXECUTABLES {
        let executable = bin_dir.join(name);
        if !executable.exists() {
            continue;
        }
        let relative = executable
            .strip_prefix(source_dir)
            .map_or_else(|_| executable.clone(), Path::to_path_buf);
        let wrapper = source_dir.join(format!("{name}.sh"));
        std::fs::write(&wrapper, wrapper_script(name, &relative))?;
        make_executable(&wrapper)?;
        info!(wrapper = %wrapper.display(), "Created wrapper");
        written.push(wrapper);
    }

    if written.is_empty() {
        warn!(dir = %bin_dir.display(), "No executables found to wrap");
    }
    Ok(written)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
