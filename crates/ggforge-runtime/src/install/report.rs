use ggforge_core::{InstallEvent, InstallStage, ProgressTracker};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Sends pipeline events to whoever is listening.
///
/// A dropped receiver is not an error: the install keeps going and the
/// events only reach the log.
pub(crate) struct Reporter {
    tx: UnboundedSender<InstallEvent>,
    tracker: ProgressTracker,
}

impl Reporter {
    pub(crate) const fn new(tx: UnboundedSender<InstallEvent>) -> Self {
        Self {
            tx,
            tracker: ProgressTracker::new(),
        }
    }

    pub(crate) fn progress(&mut self, stage: InstallStage, fraction: u8, message: impl Into<String>) {
        let event = self.tracker.advance(stage, fraction, message);
        self.send(event);
    }

    pub(crate) fn output(&mut self, stage: InstallStage, line: &str) {
        debug!(%stage, "{line}");
        self.send(InstallEvent::Output {
            stage,
            line: line.to_string(),
        });
    }

    pub(crate) fn send(&self, event: InstallEvent) {
        let _ = self.tx.send(event);
    }
}
