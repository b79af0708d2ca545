//! Command-line argument parsing with clap.

use std::path::PathBuf;

use berth_core::{DEFAULT_AUTHORIZED_KEYS, DEFAULT_LOG_TAIL};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Berth - disposable, SSH-ready containers.
#[derive(Parser, Debug, Clone)]
#[command(name = "berth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Container runtime CLI to drive.
    #[arg(long, env = "BERTH_RUNTIME", default_value = "docker", global = true)]
    pub runtime: String,

    /// Run `stop` and `rm` through sudo.
    #[arg(long, global = true)]
    pub sudo: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable output.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Launch a container and print its identifier.
    Start(StartArgs),

    /// Stop a container.
    Stop {
        /// Container identifier.
        id: String,
    },

    /// Remove a container.
    Rm {
        /// Container identifier.
        id: String,

        /// Do not pass `-f` to the runtime.
        #[arg(long)]
        no_force: bool,
    },

    /// Print a container's logs.
    Logs {
        /// Container identifier.
        id: String,

        /// Number of lines to show.
        #[arg(long, default_value_t = DEFAULT_LOG_TAIL)]
        tail: usize,
    },

    /// Print a container's state.
    Status {
        /// Container identifier.
        id: String,
    },

    /// Run statements inside a container; several are joined with `;`.
    Exec {
        /// Container identifier.
        id: String,

        /// Statements to run.
        #[arg(required = true, num_args = 1..)]
        statements: Vec<String>,
    },

    /// Copy a host file or directory into a container.
    Cp {
        /// Container identifier.
        id: String,

        /// Path on the host.
        host_path: String,

        /// Destination path inside the container.
        container_path: String,
    },

    /// Install an SSH public key inside a container.
    AddKey {
        /// Container identifier.
        id: String,

        /// Public key file on the host.
        public_key: PathBuf,

        /// Authorized keys file inside the container.
        #[arg(long, default_value = DEFAULT_AUTHORIZED_KEYS)]
        authorized_keys: String,
    },
}

/// Arguments for `berth start`.
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// JSON spec file; flags given on the command line override it.
    #[arg(long)]
    pub spec: Option<PathBuf>,

    /// Container name.
    #[arg(long)]
    pub name: Option<String>,

    /// Image to launch.
    #[arg(long)]
    pub image: Option<String>,

    /// Host port mapped to container port 22.
    #[arg(short, long)]
    pub port: Option<u16>,
}
