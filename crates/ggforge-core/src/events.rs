//! Install progress events.
//!
//! The installer sends these over a channel instead of calling back into the
//! UI. Percentages never go backwards within one run.
//!
//! ```json
//! { "type": "progress", "stage": "compile", "percent": 78, "message": "[ 40%] Building C object" }
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStage {
    Dependencies,
    Fetch,
    Configure,
    Compile,
    Wrap,
}

impl InstallStage {
    pub const ALL: [Self; 5] = [
        Self::Dependencies,
        Self::Fetch,
        Self::Configure,
        Self::Compile,
        Self::Wrap,
    ];

    /// Inclusive start and end percentage owned by this stage.
    pub const fn range(self) -> (u8, u8) {
        match self {
            Self::Dependencies => (0, 10),
            Self::Fetch => (10, 40),
            Self::Configure => (40, 70),
            Self::Compile => (70, 90),
            Self::Wrap => (90, 100),
        }
    }

    /// Map a 0-100 fraction of this stage onto the overall scale.
    pub fn scale(self, fraction: u8) -> u8 {
        let (start, end) = self.range();
        let span = u16::from(end - start);
        let offset = span * u16::from(fraction.min(100)) / 100;
        // offset <= span <= 100, so this fits in u8
        start + u8::try_from(offset).unwrap_or(end - start)
    }
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Dependencies => "dependencies",
            Self::Fetch => "fetch",
            Self::Configure => "configure",
            Self::Compile => "compile",
            Self::Wrap => "wrap",
        };
        f.write_str(s)
    }
}

/// Events emitted by the install pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallEvent {
    /// A stage began or progressed, with a human-readable line.
    Progress {
        stage: InstallStage,
        percent: u8,
        message: String,
    },

    /// Raw output from an external tool, for logs and verbose views.
    Output { stage: InstallStage, line: String },

    /// The flags for the configure step are settled.
    FlagsResolved {
        flags: Vec<String>,
        /// `custom`, `synthesized` or `static`.
        source: String,
        description: String,
    },

    /// The pipeline finished.
    Completed {
        /// Checkout directory containing the build and wrappers.
        source_dir: PathBuf,
        /// Wrapper scripts that were written.
        wrappers: Vec<PathBuf>,
    },

    /// The pipeline stopped at `stage`.
    Failed { stage: InstallStage, error: String },
}

/// Produces [`InstallEvent::Progress`] values that never decrease.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    last: u8,
}

impl ProgressTracker {
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Percentage of the most recent event.
    pub const fn current(&self) -> u8 {
        self.last
    }

    /// Event at `fraction` (0-100) through `stage`.
    ///
    /// The percentage is clamped so it is never below an earlier event.
    pub fn advance(
        &mut self,
        stage: InstallStage,
        fraction: u8,
        message: impl Into<String>,
    ) -> InstallEvent {
        self.last = self.last.max(stage.scale(fraction)).min(100);
        InstallEvent::Progress {
            stage,
            percent: self.last,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ranges_are_contiguous() {
        let mut expected_start = 0;
        for stage in InstallStage::ALL {
            let (start, end) = stage.range();
            assert_eq!(start, expected_start, "{stage}");
            assert!(end > start);
            expected_start = end;
        }
        assert_eq!(expected_start, 100);
    }

    #[test]
    fn test_scale() {
        assert_eq!(InstallStage::Compile.scale(0), 70);
        assert_eq!(InstallStage::Compile.scale(50), 80);
        assert_eq!(InstallStage::Compile.scale(100), 90);
        assert_eq!(InstallStage::Compile.scale(250), 90);
    }

    #[test]
    fn test_tracker_is_monotonic() {
        let mut tracker = ProgressTracker::new();
        tracker.advance(InstallStage::Compile, 80, "late");
        let event = tracker.advance(InstallStage::Compile, 10, "out of order");
        assert_eq!(
            event,
            InstallEvent::Progress {
                stage: InstallStage::Compile,
                percent: 86,
                message: "out of order".to_string(),
            }
        );
    }

    #[test]
    fn test_event_wire_format() {
        let event = InstallEvent::Progress {
            stage: InstallStage::Fetch,
            percent: 10,
            message: "cloning".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["stage"], "fetch");
        assert_eq!(json["percent"], 10);
    }
}
