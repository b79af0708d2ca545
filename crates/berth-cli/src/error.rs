//! CLI error types.

use berth_core::ContainerError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// A container operation failed.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The wrapped runtime command exited non-zero.
    #[error("`{command}` exited with {}", describe_exit(.exit_code))]
    CommandFailed {
        /// Command line that was run.
        command: String,
        /// Exit code, `None` if terminated by a signal.
        exit_code: Option<i32>,
    },

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}
