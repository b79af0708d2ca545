//! Berth CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use berth_cli::cli::Cli;
use berth_cli::commands::Session;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let session = Session::new(cli);
    let mut stdout = io::stdout().lock();

    session
        .execute(&mut stdout, &cli.command)
        .with_context(|| format!("berth {} failed", subcommand_name(cli)))
}

fn subcommand_name(cli: &Cli) -> &'static str {
    use berth_cli::cli::Commands;

    match cli.command {
        Commands::Start(_) => "start",
        Commands::Stop { .. } => "stop",
        Commands::Rm { .. } => "rm",
        Commands::Logs { .. } => "logs",
        Commands::Status { .. } => "status",
        Commands::Exec { .. } => "exec",
        Commands::Cp { .. } => "cp",
        Commands::AddKey { .. } => "add-key",
    }
}
