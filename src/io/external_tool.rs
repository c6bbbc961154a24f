//! Subprocess runner for external analysis tools (lizard, semgrep).

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::errors::{Error, Result};

/// Captured output of a finished tool run
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Fail early with `ToolUnavailable` when `tool` is not on PATH
pub fn require_tool(tool: &str) -> Result<()> {
    which::which(tool)
        .map(|path| debug!("Using {} at {}", tool, path.display()))
        .map_err(|_| Error::ToolUnavailable(tool.to_string()))
}

/// Run `program args...` in `cwd`, killing it after `timeout_secs`
/// (0 disables the limit).
pub fn run_tool(program: &str, args: &[String], cwd: Option<&Path>, timeout_secs: u64) -> Result<ToolOutput> {
    debug!("Running {} {:?}", program, args);

    let mut command = Command::new(program);
    command.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ToolUnavailable(program.to_string())
        } else {
            Error::tool(program, format!("failed to start: {}", e))
        }
    })?;

    // pipes are drained concurrently with the wait
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let exit_code = match wait_with_timeout(&mut child, program, timeout_secs) {
        Ok(code) => code,
        Err(e) => {
            // a killed tool's grandchildren may still hold the pipes open
            let deadline = Instant::now() + READER_GRACE;
            for handle in [stdout, stderr].into_iter().flatten() {
                if !reader_finished_by(&handle, deadline) {
                    debug!("Leaving {} output reader to finish on its own", program);
                    continue;
                }
                let _ = handle.join();
            }
            return Err(e);
        }
    };

    Ok(ToolOutput {
        stdout: join_reader(stdout),
        stderr: join_reader(stderr),
        exit_code,
    })
}

/// How long readers of a killed tool get to reach end of output
const READER_GRACE: Duration = Duration::from_millis(500);

fn reader_finished_by(handle: &thread::JoinHandle<String>, deadline: Instant) -> bool {
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(20));
    }
    true
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn wait_with_timeout(child: &mut Child, program: &str, timeout_secs: u64) -> Result<Option<i32>> {
    let started = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);

    loop {
        match child.try_wait()? {
            Some(status) => return Ok(status.code()),
            None if timeout_secs > 0 && started.elapsed() > timeout => {
                if let Err(e) = child.kill() {
                    debug!("Failed to kill {}: {}", program, e);
                }
                if let Err(e) = child.wait() {
                    debug!("Failed to reap {}: {}", program, e);
                }
                warn!("{} timed out after {}s", program, timeout_secs);
                return Err(Error::timeout(program, timeout_secs));
            }
            None => thread::sleep(Duration::from_millis(100)),
        }
    }
}
