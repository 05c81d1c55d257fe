use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::foundation::error::{LaserframeError, LaserframeResult};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Captured result of a finished child process.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl ProcessOutput {
    /// `Ok(stdout)` on a zero exit, otherwise a `Vectorize` error carrying stderr.
    pub fn into_success(self, what: &str) -> LaserframeResult<Vec<u8>> {
        if self.status.success() {
            return Ok(self.stdout);
        }
        Err(LaserframeError::vectorize(format!(
            "{what} exited with status {}: {}",
            self.status,
            self.stderr.trim()
        )))
    }
}

/// Run `cmd` to completion, feeding `stdin` and collecting both output streams.
///
/// With a `timeout`, the child is killed once it elapses and a `Vectorize` error is returned.
/// Stream readers run on their own threads so a chatty child can never block on a full pipe.
pub fn run_with_timeout(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    timeout: Option<Duration>,
) -> LaserframeResult<ProcessOutput> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| {
        LaserframeError::vectorize(format!("failed to spawn {program}: {e}"))
    })?;

    let writer = match (stdin, child.stdin.take()) {
        (Some(bytes), Some(mut pipe)) => {
            let bytes = bytes.to_vec();
            // A child that exits early closes the pipe; the exit status reports the real failure.
            Some(thread::spawn(move || {
                let _ = pipe.write_all(&bytes);
            }))
        }
        _ => None,
    };
    let stdout_reader = child.stdout.take().map(|mut s| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = s.read_to_end(&mut buf);
            buf
        })
    });
    let stderr_reader = child.stderr.take().map(|mut s| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = s.read_to_end(&mut buf);
            buf
        })
    });

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(LaserframeError::vectorize(format!(
                    "failed to wait for {program}: {e}"
                )));
            }
        }
        if let Some(limit) = timeout
            && started.elapsed() >= limit
        {
            let _ = child.kill();
            let _ = child.wait();
            return Err(LaserframeError::vectorize(format!(
                "{program} timed out after {} ms",
                limit.as_millis()
            )));
        }
        thread::sleep(POLL_INTERVAL);
    };

    if let Some(w) = writer {
        let _ = w.join();
    }
    let stdout = stdout_reader
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    let stderr = stderr_reader
        .and_then(|h| h.join().ok())
        .unwrap_or_default();

    Ok(ProcessOutput {
        status,
        stdout,
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/vectorize/process.rs"]
mod tests;
