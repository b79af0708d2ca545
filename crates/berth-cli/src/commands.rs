//! Subcommand implementations.

use std::io::Write;
use std::sync::Arc;

use berth_core::{CommandExecutor, ContainerHandle, ContainerSpec, ProcessOutput, ShellExecutor};
use tracing::{debug, warn};

use crate::cli::{Cli, Commands, StartArgs};
use crate::error::CliError;
use crate::output::{Done, OutputFormat, Started, StatusReport};

/// Runs subcommands against one runtime.
#[derive(Debug, Clone)]
pub struct Session {
    runtime: String,
    sudo: bool,
    format: OutputFormat,
    executor: Arc<dyn CommandExecutor>,
}

impl Session {
    /// Create a session from parsed arguments, running commands through `sh`.
    #[must_use]
    pub fn new(cli: &Cli) -> Self {
        Self::with_executor(cli, Arc::new(ShellExecutor::new()))
    }

    /// Create a session that runs commands through `executor`.
    #[must_use]
    pub fn with_executor(cli: &Cli, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            runtime: cli.runtime.clone(),
            sudo: cli.sudo,
            format: OutputFormat::new(cli.format),
            executor,
        }
    }

    /// Execute one subcommand, writing its result to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the container operation fails or the wrapped
    /// runtime command exits non-zero.
    pub fn execute<W: Write>(&self, out: &mut W, command: &Commands) -> Result<(), CliError> {
        match command {
            Commands::Start(args) => self.start(out, args),
            Commands::Stop { id } => {
                let output = self.attach(id).stop()?;
                self.report(out, &output)
            }
            Commands::Rm { id, no_force } => {
                let output = self.attach(id).remove(!no_force)?;
                self.report(out, &output)
            }
            Commands::Logs { id, tail } => {
                let output = self.attach(id).logs(*tail)?;
                self.report(out, &output)
            }
            Commands::Status { id } => {
                let status = self.attach(id).status()?;
                self.format.write(
                    out,
                    &StatusReport {
                        id: id.clone(),
                        status,
                    },
                )
            }
            Commands::Exec { id, statements } => {
                let output = self.attach(id).execute(statements.clone())?;
                self.report(out, &output)
            }
            Commands::Cp {
                id,
                host_path,
                container_path,
            } => {
                self.attach(id).add_files(host_path, container_path)?;
                self.format.write(
                    out,
                    &Done {
                        id: id.clone(),
                        message: format!("copied {host_path} to {id}:{container_path}"),
                    },
                )
            }
            Commands::AddKey {
                id,
                public_key,
                authorized_keys,
            } => {
                self.attach(id)
                    .add_public_key_to(public_key, authorized_keys)?;
                self.format.write(
                    out,
                    &Done {
                        id: id.clone(),
                        message: format!(
                            "installed {} into {id}:{authorized_keys}",
                            public_key.display()
                        ),
                    },
                )
            }
        }
    }

    /// Resolve the spec for `berth start`: spec file first, then flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec file cannot be read or no image is set.
    pub fn resolve_spec(&self, args: &StartArgs) -> Result<ContainerSpec, CliError> {
        let mut spec = match &args.spec {
            Some(path) => ContainerSpec::from_json_file(path)?,
            None => ContainerSpec::new().runtime(&self.runtime),
        };

        if let Some(name) = &args.name {
            spec = spec.named(name);
        }
        if let Some(image) = &args.image {
            spec = spec.image(image);
        }
        if let Some(port) = args.port {
            spec = spec.port(port);
        }

        if spec.image.is_empty() {
            return Err(CliError::Config(
                "an image is required (--image or \"image\" in --spec)".to_string(),
            ));
        }

        // The handle is dropped when this process exits; stopping it then
        // would undo the launch.
        if spec.stop_after_completion {
            warn!(name = %spec.name, "ignoring stop_after_completion from spec file");
        }
        Ok(spec.stop_after_completion(false))
    }

    fn start<W: Write>(&self, out: &mut W, args: &StartArgs) -> Result<(), CliError> {
        let spec = self.resolve_spec(args)?;
        let handle = spec.start_with(Arc::clone(&self.executor))?;

        self.format.write(
            out,
            &Started {
                id: handle.docker_identifier().to_string(),
                short_id: handle.short_docker_identifier().to_string(),
                name: handle.name().to_string(),
                image: spec.image.clone(),
                port: spec.port,
            },
        )
    }

    fn attach(&self, id: &str) -> ContainerHandle {
        let mut handle = ContainerSpec::new()
            .runtime(&self.runtime)
            .attach_with(id, Arc::clone(&self.executor));
        if self.sudo {
            handle.use_sudo();
        }
        handle
    }

    fn report<W: Write>(&self, out: &mut W, output: &ProcessOutput) -> Result<(), CliError> {
        self.format.write(out, output)?;
        debug!(command = %output.command, exit_code = ?output.exit_code, "runtime command finished");

        if output.success() {
            Ok(())
        } else {
            Err(CliError::CommandFailed {
                command: output.command.clone(),
                exit_code: output.exit_code,
            })
        }
    }
}
