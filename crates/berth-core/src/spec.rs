//! Container launch configuration.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::command::{DEFAULT_RUNTIME, DockerCli};
use crate::error::{ContainerError, ContainerResult};
use crate::executor::{CommandExecutor, ShellExecutor};
use crate::handle::ContainerHandle;

/// Host port mapped to the container's SSH port when none is configured.
pub const DEFAULT_PORT: u16 = 4848;

/// Length of the random suffix appended to display names.
const NAME_SUFFIX_LEN: usize = 8;

/// Desired configuration of a container.
///
/// Setting fields has no external effect; nothing runs until [`start`](Self::start).
/// No value is validated here: an empty image simply makes the launch fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSpec {
    /// Name passed to the runtime's `--name` flag.
    pub name: String,

    /// Image reference to launch.
    pub image: String,

    /// Host port mapped to container port 22.
    pub port: u16,

    /// Stop the container when its handle is dropped.
    pub stop_after_completion: bool,

    /// Runtime CLI binary (`docker`, `podman`, ...).
    pub runtime: String,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            image: String::new(),
            port: DEFAULT_PORT,
            stop_after_completion: false,
            runtime: DEFAULT_RUNTIME.to_string(),
        }
    }
}

impl ContainerSpec {
    /// Create a spec with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the container name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the image to launch.
    #[must_use]
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Set the host port mapped to container port 22.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Stop the container when its handle is dropped.
    #[must_use]
    pub fn stop_after_completion(mut self, stop: bool) -> Self {
        self.stop_after_completion = stop;
        self
    }

    /// Use a different runtime CLI binary.
    #[must_use]
    pub fn runtime(mut self, program: impl Into<String>) -> Self {
        self.runtime = program.into();
        self
    }

    /// Parse a spec from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a spec.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read a spec from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::FileReadFailed`] if the file cannot be read,
    /// or [`ContainerError::InvalidSpec`] if it does not contain a valid spec.
    pub fn from_json_file(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| ContainerError::FileReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&contents).map_err(|source| ContainerError::InvalidSpec {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Command composer for this spec's runtime.
    #[must_use]
    pub fn cli(&self) -> DockerCli {
        DockerCli::new(&self.runtime)
    }

    /// The launch command this spec produces.
    #[must_use]
    pub fn launch_command(&self) -> String {
        self.cli().run(self.port, &self.name, &self.image)
    }

    /// Launch the container through the system shell.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::LaunchFailed`] if the runtime exits non-zero
    /// or cannot be run at all.
    pub fn start(&self) -> ContainerResult<ContainerHandle> {
        self.start_with(Arc::new(ShellExecutor::new()))
    }

    /// Launch the container through the given executor.
    ///
    /// The handle keeps a snapshot of this spec; later changes to `self` do
    /// not affect it.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::LaunchFailed`] if the runtime exits non-zero
    /// or cannot be run at all.
    pub fn start_with(
        &self,
        executor: Arc<dyn CommandExecutor>,
    ) -> ContainerResult<ContainerHandle> {
        let command = self.launch_command();
        debug!(command = %command, "launching container");

        let output = executor
            .run(&command)
            .map_err(|e| ContainerError::LaunchFailed {
                image: self.image.clone(),
                exit_code: None,
                output: e.to_string(),
            })?;

        if !output.success() {
            return Err(ContainerError::LaunchFailed {
                image: self.image.clone(),
                exit_code: output.exit_code,
                output: output.combined(),
            });
        }

        let handle = ContainerHandle::new(
            Arc::new(self.clone()),
            executor,
            output.stdout_trimmed(),
            self.display_name(),
        );

        info!(
            id = %handle.short_docker_identifier(),
            name = %handle.name(),
            image = %self.image,
            port = self.port,
            "container started"
        );

        Ok(handle)
    }

    /// Wrap an already-running container in a handle through the system shell.
    #[must_use]
    pub fn attach(&self, identifier: &str) -> ContainerHandle {
        self.attach_with(identifier, Arc::new(ShellExecutor::new()))
    }

    /// Wrap an already-running container in a handle without launching anything.
    #[must_use]
    pub fn attach_with(
        &self,
        identifier: &str,
        executor: Arc<dyn CommandExecutor>,
    ) -> ContainerHandle {
        ContainerHandle::new(
            Arc::new(self.clone()),
            executor,
            identifier.trim(),
            self.display_name(),
        )
    }

    /// `{name}-{8 hex chars}`. Client-side label only; the runtime is given
    /// the bare `name`.
    fn display_name(&self) -> String {
        let suffix: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(NAME_SUFFIX_LEN)
            .collect();
        format!("{}-{suffix}", self.name)
    }
}
