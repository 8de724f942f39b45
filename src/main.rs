use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use veriluxe_deploy::cli::{Cli, Command};
use veriluxe_deploy::commands;

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	match &cli.command {
		Command::Deploy(args) => commands::deploy::run(args).await,
		Command::Keygen { json, network } => commands::keygen::run(*json, *network),
		Command::State { command } => commands::state::run(command),
	}
}

/// Diagnostics go to stderr; RUST_LOG wins over `--verbose`.
fn init_tracing(verbose: bool) {
	let default = if verbose { "veriluxe_deploy=debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}
