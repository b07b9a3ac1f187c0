//! Line streaming for long-running install steps.
//!
//! Both pipes are read by their own task and merged into one channel, so the
//! caller sees lines in roughly the order the tool wrote them.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;

use super::error::{InstallError, InstallResult};

fn forward<R>(pipe: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
}

/// Run `program` to completion, handing each non-empty output line (or
/// carriage-return segment) to `on_line`. Returns the exit code, `None` if
/// the child was killed by a signal.
pub(crate) async fn run_streamed<I, S, F>(
    program: &str,
    args: I,
    cwd: Option<&Path>,
    mut on_line: F,
) -> InstallResult<Option<i32>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    F: FnMut(&str),
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| InstallError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        forward(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        forward(stderr, tx);
    } else {
        drop(tx);
    }

    while let Some(line) = rx.recv().await {
        // git redraws progress with carriage returns inside a single line.
        for part in line.split('\r').map(str::trim_end) {
            if !part.trim().is_empty() {
                on_line(part);
            }
        }
    }

    let status = child.wait().await?;
    debug!(program, code = ?status.code(), "Step finished");
    Ok(status.code())
}
