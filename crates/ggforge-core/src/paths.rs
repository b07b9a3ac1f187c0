//! Install directory layout and path helpers.
//!
//! ```text
//! <base>/
//!   logs/               rolling log files
//!   llama.cpp/          git checkout
//!     build/            cmake binary dir
//!     llama-cli.sh      wrapper scripts
//!     build-record.json
//! ```

use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the checkout directory created under the install base.
pub const SOURCE_DIR_NAME: &str = "llama.cpp";

/// Errors that can occur during path resolution and directory operations.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Path cannot be empty")]
    EmptyPath,

    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    #[error("Directory {path} is not writable: {reason}")]
    NotWritable { path: PathBuf, reason: String },

    #[error("Cannot determine current directory: {0}")]
    CurrentDirError(String),
}

/// Expand `~` and make a user-supplied path absolute.
pub fn normalize_user_path(raw: &str) -> Result<PathBuf, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::EmptyPath);
    }

    let expanded = if trimmed == "~" || trimmed.starts_with("~/") {
        let home = dirs::home_dir().ok_or(PathError::NoHomeDir)?;
        match trimmed.strip_prefix("~/") {
            Some(rest) => home.join(rest),
            None => home,
        }
    } else {
        PathBuf::from(trimmed)
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(expanded))
            .map_err(|e| PathError::CurrentDirError(e.to_string()))
    }
}

/// Install base: the given directory, or the working directory.
pub fn resolve_install_base(raw: Option<&str>) -> Result<PathBuf, PathError> {
    match raw {
        Some(raw) => normalize_user_path(raw),
        None => env::current_dir().map_err(|e| PathError::CurrentDirError(e.to_string())),
    }
}

pub fn source_dir(base: &Path) -> PathBuf {
    base.join(SOURCE_DIR_NAME)
}

pub fn build_dir(base: &Path) -> PathBuf {
    source_dir(base).join("build")
}

pub fn logs_dir(base: &Path) -> PathBuf {
    base.join("logs")
}

pub fn build_record_path(base: &Path) -> PathBuf {
    source_dir(base).join("build-record.json")
}

/// Create `path` (and parents) if missing, then check it is writable.
pub fn ensure_directory(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
    } else {
        fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    verify_writable(path)
}

/// Verify a directory is writable by creating and removing a probe file.
pub fn verify_writable(path: &Path) -> Result<(), PathError> {
    let test_file = path.join(".ggforge_write_test");
    let not_writable = |e: std::io::Error| PathError::NotWritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&test_file)
        .map_err(not_writable)?;
    file.write_all(b"test").map_err(not_writable)?;
    drop(file);
    let _ = fs::remove_file(&test_file);
    Ok(())
}
