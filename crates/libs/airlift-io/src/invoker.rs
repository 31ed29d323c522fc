//! Single-shot command execution with resource bounds.

use std::{
    path::PathBuf,
    process::Stdio,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::warn;

use crate::prelude::*;

/// One external command with its full execution context.
///
/// The working directory is a required part of the invocation, not an
/// ambient assumption: the build automation tool only behaves correctly
/// when started from the project root it was configured for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute.
    pub program: String,
    /// Command line arguments.
    pub args: Vec<String>,
    /// Directory the program runs from.
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Create a new invocation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use airlift_io::invoker::Invocation;
    ///
    /// let invocation = Invocation::new("ls", vec!["-la"], "/tmp");
    /// assert_eq!(invocation.full_command(), "ls -la");
    /// ```
    pub fn new(
        program: impl Into<String>,
        args: Vec<impl Into<String>>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(|a| a.into()).collect(),
            working_dir: working_dir.into(),
        }
    }

    /// Get the full command string with arguments.
    pub fn full_command(&self) -> String {
        format!("{} {}", &self.program, &self.args.join(" "))
    }
}

/// Resource bounds applied to a single invocation.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Wall-clock bound for the whole invocation.
    pub timeout: Duration,
    /// Combined stdout and stderr byte ceiling.
    pub max_output_bytes: usize,
}

/// Captured output of a successfully finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured standard output, possibly truncated at the byte ceiling.
    pub stdout: String,
    /// Captured standard error, possibly truncated at the byte ceiling.
    pub stderr: String,
}

/// Run one external command to completion.
///
/// The child runs with piped stdout/stderr and a closed stdin. Both streams
/// are drained concurrently against a shared byte budget; once the budget is
/// exhausted further output is read but discarded, so a misbehaving tool can
/// neither balloon gateway memory nor deadlock on a full pipe.
///
/// # Errors
///
/// - [`Error::Spawn`] when the program cannot be started
/// - [`Error::Timeout`] when the wall-clock bound elapses; the child is
///   killed and nothing is returned
/// - [`Error::CommandFailed`] on a non-zero exit, carrying the captured
///   output text
pub async fn run(invocation: &Invocation, limits: Limits) -> Result<CommandOutput> {
    let mut child = Command::new(&invocation.program)
        .args(&invocation.args)
        .current_dir(&invocation.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| Error::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

    let budget = Arc::new(AtomicUsize::new(limits.max_output_bytes));
    let stdout_task = tokio::spawn(read_capped(child.stdout.take(), Arc::clone(&budget)));
    let stderr_task = tokio::spawn(read_capped(child.stderr.take(), budget));

    let status = match tokio::time::timeout(limits.timeout, child.wait()).await {
        Ok(status) => status?,
        Err(_) => {
            if let Err(err) = child.kill().await {
                warn!("Failed to kill '{}' on timeout: {err}", invocation.program);
            }
            return Err(Error::Timeout {
                program: invocation.program.clone(),
                timeout_secs: limits.timeout.as_secs(),
            });
        }
    };

    let stdout = stdout_task.await.map_err(|_| Error::StreamCapture)?;
    let stderr = stderr_task.await.map_err(|_| Error::StreamCapture)?;

    if !status.success() {
        return Err(Error::CommandFailed {
            program: invocation.program.clone(),
            status,
            stdout,
            stderr,
        });
    }

    Ok(CommandOutput { stdout, stderr })
}

/// Drain one stream, keeping at most the bytes granted by the shared budget.
async fn read_capped<T>(stream: Option<T>, budget: Arc<AtomicUsize>) -> String
where
    T: AsyncRead + Unpin + Send + 'static,
{
    let Some(mut stream) = stream else {
        return String::new();
    };

    let mut captured = Vec::new();
    let mut truncated = false;
    let mut buffer = [0; 1024];
    loop {
        match stream.read(&mut buffer).await {
            Ok(0) => break, // EOF
            Ok(n) => {
                let granted = claim(&budget, n);
                if granted > 0 {
                    captured.extend_from_slice(&buffer[..granted]);
                }
                if granted < n && !truncated {
                    truncated = true;
                    warn!("Output ceiling reached, discarding further process output");
                }
            }
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&captured).into_owned()
}

/// Take up to `want` bytes from the budget, returning how many were granted.
fn claim(budget: &AtomicUsize, want: usize) -> usize {
    let mut remaining = budget.load(Ordering::Relaxed);
    loop {
        let granted = want.min(remaining);
        if granted == 0 {
            return 0;
        }
        match budget.compare_exchange(
            remaining,
            remaining - granted,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return granted,
            Err(actual) => remaining = actual,
        }
    }
}
