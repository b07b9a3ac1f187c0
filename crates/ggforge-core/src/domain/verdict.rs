use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one configure-build-run trial.
///
/// Only `Passed` confirms the candidate flags; every other variant rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeVerdict {
    ConfigureFailed,
    BuildFailed,
    RunFailed,
    Passed,
}

impl ProbeVerdict {
    pub const fn is_passed(self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl fmt::Display for ProbeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ConfigureFailed => "configure failed",
            Self::BuildFailed => "build failed",
            Self::RunFailed => "run failed",
            Self::Passed => "passed",
        };
        f.write_str(s)
    }
}
