//! Container error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by container operations.
///
/// Only launching, copying files in, and reading a local public key fail on
/// their own terms. Every other operation hands back the raw process result
/// and errors only when the shell itself could not be spawned.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The runtime could not launch the container.
    #[error("failed to launch container from image '{image}': {output}")]
    LaunchFailed {
        /// Image that was being launched.
        image: String,
        /// Exit code of the launch command, `None` if it never ran to completion.
        exit_code: Option<i32>,
        /// Captured stdout followed by stderr.
        output: String,
    },

    /// A local file could not be read.
    #[error("failed to read {path}: {source}")]
    FileReadFailed {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A spec file was read but does not describe a container spec.
    #[error("invalid container spec in {path}: {source}")]
    InvalidSpec {
        /// Spec file path.
        path: PathBuf,
        /// Parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Copying a host path into the container failed.
    #[error("failed to copy {source_path} to {destination}: {output}")]
    CopyFailed {
        /// Path on the host.
        source_path: String,
        /// `<container>:<path>` destination.
        destination: String,
        /// Exit code of the copy command.
        exit_code: Option<i32>,
        /// Captured stdout followed by stderr.
        output: String,
    },

    /// The shell running a command could not be spawned.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// Command line that was being run.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ContainerError {
    /// Creates a `Spawn` error for a command line.
    #[must_use]
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Returns `true` if the container never launched.
    #[must_use]
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, Self::LaunchFailed { .. })
    }

    /// Returns `true` if a host-to-container copy failed.
    #[must_use]
    pub fn is_copy_failure(&self) -> bool {
        matches!(self, Self::CopyFailed { .. })
    }

    /// Output captured from the failing process, when there was one.
    #[must_use]
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::LaunchFailed { output, .. } | Self::CopyFailed { output, .. } => {
                Some(output.as_str())
            }
            Self::FileReadFailed { .. } | Self::InvalidSpec { .. } | Self::Spawn { .. } => None,
        }
    }
}

/// Result type for container operations.
pub type ContainerResult<T> = std::result::Result<T, ContainerError>;
