//! Shell command execution.
//!
//! The command string goes to the platform interpreter unmodified. That is
//! only acceptable for a trusted local operator; disable the tool with
//! `allow_shell = false` whenever the caller cannot be trusted.

use super::super::result::ToolFailure;
use super::super::schema::Arguments;
use super::Workspace;
use serde_json::Value;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const READ_CHUNK: usize = 4096;

pub(super) fn run_shell_command(
    args: &Arguments,
    workspace: &Workspace,
) -> Result<Value, ToolFailure> {
    let command = args.string("command")?;
    info!(command, "Executing shell command");

    let (shell, shell_arg) = if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };

    let mut child = Command::new(shell)
        .arg(shell_arg)
        .arg(command)
        .current_dir(workspace.root())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| ToolFailure::handler(format!("failed to start {shell}: {err}")))?;

    // Both pipes must be drained while waiting or a full buffer stalls the child.
    let stdout = Capture::spawn(child.stdout.take());
    let stderr = Capture::spawn(child.stderr.take());

    let deadline = Instant::now() + workspace.shell_timeout();
    let status = wait_with_deadline(&mut child, deadline, workspace.shell_timeout())?;
    // Background processes started by the command may hold the pipes open
    // past the shell's exit; output is read only until the deadline.
    let stdout = stdout.finish(deadline);
    let stderr = stderr.finish(deadline);

    if status.success() {
        Ok(Value::String(format!("Output:\n{}", stdout.trim())))
    } else {
        warn!(command, code = ?status.code(), "Shell command exited with failure");
        Ok(Value::String(format!("Error:\n{}", stderr.trim())))
    }
}

/// Output read from one pipe by a background thread.
struct Capture {
    bytes: Arc<Mutex<Vec<u8>>>,
    /// Disconnects when the pipe reaches end of file.
    closed: mpsc::Receiver<()>,
}

impl Capture {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let bytes = Arc::new(Mutex::new(Vec::new()));
        let (eof, closed) = mpsc::channel::<()>();
        let sink = Arc::clone(&bytes);
        thread::spawn(move || {
            let _eof = eof;
            let Some(mut pipe) = pipe else { return };
            let mut chunk = [0u8; READ_CHUNK];
            while let Ok(read) = pipe.read(&mut chunk) {
                if read == 0 {
                    break;
                }
                sink.lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .extend_from_slice(&chunk[..read]);
            }
        });
        Self { bytes, closed }
    }

    fn finish(self, deadline: Instant) -> String {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if let Err(mpsc::RecvTimeoutError::Timeout) = self.closed.recv_timeout(remaining) {
            debug!("Pipe still open at the deadline, keeping partial output");
        }
        let bytes = self.bytes.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn wait_with_deadline(
    child: &mut Child,
    deadline: Instant,
    timeout: Duration,
) -> Result<ExitStatus, ToolFailure> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolFailure::handler(format!(
                    "command timed out after {timeout:?}"
                )));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                return Err(ToolFailure::handler(format!(
                    "failed to wait for command: {err}"
                )));
            }
        }
    }
}
