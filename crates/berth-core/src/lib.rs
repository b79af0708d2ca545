//! # berth-core
//!
//! Disposable, addressable Docker containers for test fixtures and
//! short-lived environments.
//!
//! A [`ContainerSpec`] describes what to launch. [`ContainerSpec::start`]
//! launches it detached and auto-removed, with a host port mapped to the
//! container's SSH port, and returns a [`ContainerHandle`] addressed by the
//! container's short identifier.
//!
//! ## Example
//!
//! ```rust,no_run
//! use berth_core::ContainerSpec;
//!
//! # fn example() -> berth_core::ContainerResult<()> {
//! let container = ContainerSpec::new()
//!     .named("fixture")
//!     .image("rastasheep/ubuntu-sshd")
//!     .port(2222)
//!     .stop_after_completion(true)
//!     .start()?;
//!
//! container
//!     .add_public_key("/home/me/.ssh/id_ed25519.pub")?
//!     .add_files("./fixtures", "/srv/fixtures")?;
//!
//! let output = container.execute(["cd /srv/fixtures", "ls -la"])?;
//! println!("{}", output.stdout);
//! // Dropping `container` stops it.
//! # Ok(())
//! # }
//! ```
//!
//! ## Shell interpolation
//!
//! Commands are composed as shell lines and run with `sh -c`. Names, paths,
//! images and scripts are interpolated without escaping, so anything passed in
//! must already be safe to embed in a shell command line.
//!
//! ## Errors
//!
//! Launching, copying files and reading a public key fail with a
//! [`ContainerError`]. `stop`, `remove`, `logs`, `status` and `execute` return
//! the raw [`ProcessOutput`] even when the runtime exits non-zero; they only
//! fail if the shell itself cannot be spawned.

#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod executor;
pub mod handle;
pub mod output;
pub mod spec;

// Re-exports
pub use command::{DockerCli, Script};
pub use error::{ContainerError, ContainerResult};
pub use executor::{CommandExecutor, FakeExecutor, ShellExecutor};
pub use handle::{ContainerHandle, DEFAULT_AUTHORIZED_KEYS, DEFAULT_LOG_TAIL};
pub use output::ProcessOutput;
pub use spec::{ContainerSpec, DEFAULT_PORT};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_module_exports() {
        let _ = ContainerSpec::new();
        let _ = Script::from("true");
        let _ = DockerCli::default();
        let _ = ShellExecutor::new();
        let _ = ProcessOutput::default();
    }
}
