//! Async subprocess execution for the external CLIs (`gh`, `claude`).

use std::ffi::OsStr;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code (-1 when terminated by a signal).
    pub exit_code: i32,

    pub stdout: String,

    pub stderr: String,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,

    pub success: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {} seconds", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("io error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Run `program` with `args`, optionally feeding `stdin`, bounded by `timeout`.
///
/// The child is killed if the timeout elapses or the returned future is dropped.
pub async fn run_command<S: AsRef<OsStr>>(
    program: &OsStr,
    args: &[S],
    stdin: Option<&str>,
    timeout: Duration,
) -> Result<CommandOutput, ProcessError> {
    let name = program.to_string_lossy().into_owned();
    let start = Instant::now();

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: name.clone(),
            source,
        })?;

    // Feed stdin from a separate task so a chatty child cannot deadlock us.
    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => {
            let input = input.to_owned();
            Some(tokio::spawn(async move {
                let result = pipe.write_all(input.as_bytes()).await;
                drop(pipe);
                result
            }))
        }
        _ => None,
    };

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| ProcessError::TimedOut {
            program: name.clone(),
            timeout,
        })?
        .map_err(|source| ProcessError::Io {
            program: name.clone(),
            source,
        })?;

    if let Some(writer) = writer {
        // A child that exits without draining stdin yields a broken pipe; its
        // exit status is what matters.
        if let Ok(Err(e)) = writer.await {
            debug!(program = %name, error = %e, "stdin not fully consumed");
        }
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    debug!(program = %name, duration_ms, status = ?output.status, "command finished");

    Ok(CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration_ms,
        success: output.status.success(),
    })
}
