//! Terminal progress bar fed from the installer's event channel.

use ggforge_core::{InstallEvent, Translator};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}";

fn create_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    let style = ProgressStyle::with_template(TEMPLATE)
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("█▓░"));
    pb.set_style(style);
    pb
}

/// Render events until the sender side is dropped.
///
/// Settled flags are always printed above the bar; raw tool output only when
/// `verbose` is set.
pub async fn drive(mut events: UnboundedReceiver<InstallEvent>, t: Translator, verbose: bool) {
    let pb = create_bar();
    while let Some(event) = events.recv().await {
        match event {
            InstallEvent::Progress {
                percent, message, ..
            } => {
                pb.set_position(u64::from(percent));
                pb.set_message(message);
            }
            InstallEvent::FlagsResolved {
                flags,
                source,
                description,
            } => {
                pb.println(flag_summary(&flags, &source, &description, &t));
            }
            InstallEvent::Output { line, .. } => {
                if verbose {
                    pb.println(line);
                }
            }
            InstallEvent::Completed { .. } => {
                pb.set_position(100);
                pb.finish();
            }
            InstallEvent::Failed { stage, error } => {
                pb.abandon_with_message(format!("{stage}: {error}"));
            }
        }
    }
    if !pb.is_finished() {
        pb.finish_and_clear();
    }
}

/// Flags block printed once the configure flags are known.
pub fn flag_summary(flags: &[String], source: &str, description: &str, t: &Translator) -> String {
    let mut lines = vec![t.t("compilation_flags")];
    lines.extend(flags.iter().map(|flag| format!("  {flag}")));
    lines.push(t.t_with("flag_source", &[("source", source)]));
    lines.push(description.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use ggforge_core::{InstallStage, Language};
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn test_drive_ends_when_sender_drops() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(InstallEvent::Progress {
            stage: InstallStage::Fetch,
            percent: 12,
            message: "Downloading".to_string(),
        })
        .unwrap();
        tx.send(InstallEvent::Failed {
            stage: InstallStage::Fetch,
            error: "git clone failed".to_string(),
        })
        .unwrap();
        drop(tx);

        drive(rx, Translator::new(Language::En), false).await;
    }

    #[test]
    fn test_flag_summary() {
        let t = Translator::new(Language::En);
        let flags = vec!["-DGGML_AVX=ON".to_string(), "-DGGML_LTO=OFF".to_string()];
        let out = flag_summary(&flags, "synthesized", "Dynamically optimized for AVX", &t);
        assert_eq!(
            out,
            "Compiling with optimization flags:\n  -DGGML_AVX=ON\n  -DGGML_LTO=OFF\n\
             Flag source: synthesized\nDynamically optimized for AVX"
        );
    }
}
