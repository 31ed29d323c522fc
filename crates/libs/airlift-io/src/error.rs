//! Invocation error types.

use std::process::ExitStatus;

/// Errors that can occur while running an external command.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Process could not be spawned.
    #[error("Failed to spawn '{program}'")]
    Spawn {
        /// Program that could not be started.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Process exceeded its wall-clock bound and was killed.
    #[error("'{program}' did not finish within {timeout_secs} seconds")]
    Timeout {
        /// Program that was killed.
        program: String,
        /// The bound that was exceeded.
        timeout_secs: u64,
    },

    /// Process exited with a non-zero status.
    #[error("'{program}' exited with {status}")]
    CommandFailed {
        /// Program that failed.
        program: String,
        /// Exit status reported by the OS.
        status: ExitStatus,
        /// Captured standard output, possibly truncated.
        stdout: String,
        /// Captured standard error, possibly truncated.
        stderr: String,
    },

    /// An output reader task did not complete.
    #[error("Failed to capture process output")]
    StreamCapture,

    /// Other I/O failure while managing the child process.
    #[error(transparent)]
    IO(#[from] std::io::Error),
}
