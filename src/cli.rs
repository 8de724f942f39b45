use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::network::Network;

#[derive(Parser)]
#[command(
	name = "veriluxe-deploy",
	about = "Deploy the VeriLuxe authenticity contract to Stellar and manage admin keys.",
	version
)]
pub struct Cli {
	/// Show debug logs (RPC traffic, phase transitions) on stderr.
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Upload, create, and initialize the contract.
	Deploy(DeployArgs),

	/// Generate a fresh administrator keypair.
	Keygen {
		/// Print the keypair as JSON.
		#[arg(long)]
		json: bool,

		/// Network whose account creator to point at.
		#[arg(long, default_value = "testnet")]
		network: Network,
	},

	/// Inspect or discard saved deployment progress.
	State {
		#[command(subcommand)]
		command: StateCommand,
	},
}

// -- Deploy arguments --

#[derive(Args)]
pub struct DeployArgs {
	/// Network to deploy to (testnet or futurenet).
	#[arg(default_value = "testnet")]
	pub network: Network,

	/// Path to the compiled contract. Defaults to the config value.
	#[arg(long)]
	pub wasm: Option<PathBuf>,

	/// Ignore and discard any saved progress for this network.
	#[arg(long)]
	pub fresh: bool,

	/// Override the Horizon endpoint.
	#[arg(long)]
	pub horizon_url: Option<String>,

	/// Override the Soroban RPC endpoint.
	#[arg(long)]
	pub rpc_url: Option<String>,
}

// -- State subcommands --

#[derive(Subcommand)]
pub enum StateCommand {
	/// Show the saved checkpoint for one network, or for all of them.
	Show { network: Option<Network> },

	/// Delete the saved checkpoint for a network.
	Clear {
		#[arg(default_value = "testnet")]
		network: Network,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deploy_defaults_to_testnet() {
		let cli = Cli::try_parse_from(["veriluxe-deploy", "deploy"]).unwrap();
		let Command::Deploy(args) = cli.command else {
			panic!("expected deploy");
		};
		assert_eq!(args.network, Network::Testnet);
		assert!(args.wasm.is_none());
		assert!(!args.fresh);
	}

	#[test]
	fn deploy_accepts_positional_network() {
		let cli = Cli::try_parse_from(["veriluxe-deploy", "-v", "deploy", "futurenet", "--fresh"])
			.unwrap();
		assert!(cli.verbose);
		let Command::Deploy(args) = cli.command else {
			panic!("expected deploy");
		};
		assert_eq!(args.network, Network::Futurenet);
		assert!(args.fresh);
	}

	#[test]
	fn unknown_network_is_rejected() {
		let err = Cli::try_parse_from(["veriluxe-deploy", "deploy", "mainnet"])
			.err()
			.unwrap();
		assert!(err.to_string().contains("unsupported network"));
	}

	#[test]
	fn state_clear_parses() {
		let cli = Cli::try_parse_from(["veriluxe-deploy", "state", "clear", "futurenet"]).unwrap();
		assert!(matches!(
			cli.command,
			Command::State {
				command: StateCommand::Clear {
					network: Network::Futurenet
				}
			}
		));
	}
}
