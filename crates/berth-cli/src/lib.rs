//! # berth-cli
//!
//! Command-line front end for `berth-core`.
//!
//! `berth start` launches a container and prints its identifier; every other
//! subcommand attaches to an existing container by identifier and runs one
//! handle operation against it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, StartArgs};
pub use commands::Session;
pub use error::CliError;
pub use output::OutputFormat;
