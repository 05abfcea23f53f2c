//! Bounded subprocess execution
//!
//! External helpers (currently only `plutil` for Rectangle Pro preferences)
//! run under a wall-clock deadline. On expiry the child is killed and the
//! caller gets `CommandError::Timeout`; it never blocks the run.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval while waiting on a child
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Wall-clock deadline
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn new(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    pub fn from_secs(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }

    pub fn expired(&self) -> bool {
        self.elapsed() > self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

/// Subprocess failures
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{program} timed out after {seconds:.1}s")]
    Timeout { program: String, seconds: f64 },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program}: {message}")]
    Io { program: String, message: String },
}

/// Run a command to completion within `limit`, returning its stdout.
///
/// stdout and stderr are drained on helper threads so a chatty child
/// cannot fill its pipe and stall until the deadline.
pub fn run_with_timeout(command: &mut Command, limit: Duration) -> Result<Vec<u8>, CommandError> {
    let program = command.get_program().to_string_lossy().to_string();
    let deadline = Deadline::new(limit);

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| CommandError::Spawn {
            program: program.clone(),
            message: e.to_string(),
        })?;

    let stdout_reader = child.stdout.take().map(drain);
    let stderr_reader = child.stderr.take().map(drain);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if deadline.expired() => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(program = %program, limit_secs = limit.as_secs_f64(), "subprocess killed at deadline");
                return Err(CommandError::Timeout {
                    program,
                    seconds: limit.as_secs_f64(),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL.min(deadline.remaining().max(Duration::from_millis(1)))),
            Err(e) => {
                let _ = child.kill();
                return Err(CommandError::Io {
                    program,
                    message: e.to_string(),
                });
            }
        }
    };

    let stdout = join(stdout_reader);
    let stderr = join(stderr_reader);

    if !status.success() {
        return Err(CommandError::Failed {
            program,
            status: status.to_string(),
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }

    tracing::debug!(program = %program, elapsed_ms = deadline.elapsed().as_millis() as u64, "subprocess finished");
    Ok(stdout)
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
