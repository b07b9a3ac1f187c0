//! Blocking command execution with a hard deadline.
//!
//! Output is captured by one reader thread per pipe feeding an mpsc channel,
//! while the calling thread polls the child until it exits or the deadline
//! passes. On Unix the child runs in its own process group so a timed-out
//! `cmake --build` takes its compiler children down with it.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use ggforge_core::ports::{CommandError, CommandExecutor, CommandOutput, CommandSpec};
use tracing::{debug, warn};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);
const DRAIN_TIMEOUT: Duration = Duration::from_millis(200);
/// Upper bound on collecting output after exit. A grandchild that left the
/// process group can hold the pipes open indefinitely.
const DRAIN_LIMIT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pipe {
    Stdout,
    Stderr,
}

/// [`CommandExecutor`] backed by `std::process`.
#[derive(Debug, Clone)]
pub struct SystemCommandExecutor {
    poll_interval: Duration,
}

impl Default for SystemCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCommandExecutor {
    pub const fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    fn spawn(spec: &CommandSpec) -> Result<Child, CommandError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd.spawn().map_err(|source| CommandError::Spawn {
            program: spec.program_name(),
            source,
        })
    }
}

fn spawn_reader<R>(pipe: R, kind: Pipe, tx: mpsc::Sender<(Pipe, String)>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let reader = BufReader::new(pipe);
        for line in reader.lines().map_while(Result::ok) {
            if tx.send((kind, line)).is_err() {
                break;
            }
        }
    });
}

/// Kill the child and everything it started, then reap it.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Ok(pid) = i32::try_from(child.id()) {
            if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                debug!(pid, error = %e, "killpg failed, falling back to kill");
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        debug!(command = %spec, timeout_secs = spec.timeout.as_secs(), "Running command");
        let mut child = Self::spawn(spec)?;

        let (tx, rx) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, Pipe::Stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, Pipe::Stderr, tx);
        } else {
            drop(tx);
        }

        let deadline = Instant::now() + spec.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    terminate(&mut child);
                    return Err(CommandError::Io {
                        program: spec.program_name(),
                        source,
                    });
                }
            }
            if Instant::now() >= deadline {
                warn!(command = %spec, "Command timed out, killing it");
                terminate(&mut child);
                return Err(CommandError::TimedOut {
                    program: spec.program_name(),
                    timeout: spec.timeout,
                });
            }
            thread::sleep(self.poll_interval);
        };

        // The child has exited; whatever is left is already in the pipes.
        let mut output = CommandOutput {
            code: status.code(),
            ..CommandOutput::default()
        };
        let drain_deadline = Instant::now() + DRAIN_LIMIT;
        loop {
            let wait = drain_deadline
                .saturating_duration_since(Instant::now())
                .min(DRAIN_TIMEOUT);
            if wait.is_zero() {
                warn!(command = %spec, "Output still arriving after exit, truncating");
                break;
            }
            let Ok((pipe, line)) = rx.recv_timeout(wait) else {
                break;
            };
            let buf = match pipe {
                Pipe::Stdout => &mut output.stdout,
                Pipe::Stderr => &mut output.stderr,
            };
            buf.push_str(&line);
            buf.push('\n');
        }

        debug!(command = %spec, code = ?output.code, "Command finished");
        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str, timeout: Duration) -> CommandSpec {
        CommandSpec::new("sh", timeout).arg("-c").arg(script)
    }

    #[test]
    fn test_captures_both_streams_and_exit_code() {
        let exec = SystemCommandExecutor::new();
        let out = exec
            .run(&sh("echo out; echo err 1>&2; exit 3", Duration::from_secs(5)))
            .unwrap();
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
        assert!(!out.success());
    }

    #[test]
    fn test_timeout_kills_child() {
        let exec = SystemCommandExecutor::new();
        let started = Instant::now();
        let err = exec
            .run(&sh("sleep 30", Duration::from_millis(200)))
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_output_drain_is_bounded_after_exit() {
        let exec = SystemCommandExecutor::new();
        let started = Instant::now();
        let out = exec
            .run(&sh(
                "(i=0; while [ $i -lt 500 ]; do echo tick; sleep 0.01; i=$((i+1)); done) & echo done",
                Duration::from_secs(5),
            ))
            .unwrap();
        assert_eq!(out.code, Some(0));
        assert!(out.stdout.contains("done\n"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let exec = SystemCommandExecutor::new();
        let err = exec
            .run(&CommandSpec::new(
                "ggforge-definitely-not-a-program",
                Duration::from_secs(1),
            ))
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[test]
    fn test_runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let exec = SystemCommandExecutor::new();
        let out = exec
            .run(&sh("pwd", Duration::from_secs(5)).current_dir(dir.path()))
            .unwrap();
        let reported = std::path::PathBuf::from(out.stdout.trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }
}
