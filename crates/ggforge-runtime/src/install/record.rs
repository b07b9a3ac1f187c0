//! Informational record of what was built and with which flags.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use ggforge_core::PlatformTag;
use serde::{Deserialize, Serialize};

use crate::resolve::FlagSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// When the build finished.
    pub build_date: DateTime<Utc>,
    pub tag: PlatformTag,
    /// Where the flags came from: `custom`, `synthesized` or `static`.
    pub flag_source: String,
    /// `CMake` flags used.
    pub cmake_flags: Vec<String>,
    /// Human-readable summary shown to the user.
    pub description: String,
    /// Checked-out commit, if git could report it.
    pub commit_sha: Option<String>,
}

impl BuildRecord {
    pub fn new(
        tag: PlatformTag,
        source: FlagSource,
        cmake_flags: Vec<String>,
        description: String,
        commit_sha: Option<String>,
    ) -> Self {
        Self {
            build_date: Utc::now(),
            tag,
            flag_source: source.as_str().to_string(),
            cmake_flags,
            description,
            commit_sha,
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// `git rev-parse HEAD` in `source_dir`.
pub(crate) async fn current_commit(source_dir: &Path) -> Option<String> {
    let output = tokio::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(source_dir)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}
