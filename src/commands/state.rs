use anyhow::Result;

use crate::cli::StateCommand;
use crate::config::Config;
use crate::deploy::{CheckpointStore, Phase};
use crate::network::Network;

pub fn run(cmd: &StateCommand) -> Result<()> {
	let config = Config::load()?;
	let store = config.checkpoint_store();

	match cmd {
		StateCommand::Show { network: Some(network) } => show(&store, *network),
		StateCommand::Show { network: None } => {
			for (i, network) in Network::ALL.into_iter().enumerate() {
				if i > 0 {
					println!();
				}
				show(&store, network)?;
			}
			Ok(())
		}
		StateCommand::Clear { network } => {
			if store.clear(*network)? {
				println!("Cleared saved progress for {network}");
			} else {
				println!("No saved progress for {network}");
			}
			Ok(())
		}
	}
}

fn show(store: &CheckpointStore, network: Network) -> Result<()> {
	let Some(cp) = store.load(network)? else {
		println!("No saved progress for {network}");
		return Ok(());
	};

	println!("Network:  {}", cp.network);
	println!("Admin:    {}", cp.admin);
	println!("WASM:     {}", cp.wasm);
	println!("Phase:    {}", cp.phase.label());
	println!("Updated:  {}", cp.updated_at.to_rfc3339());
	match &cp.phase {
		Phase::Instantiated { contract, .. }
		| Phase::Initialized { contract, .. } => {
			println!("Contract: {contract}");
		}
		_ => {}
	}
	if let Some(step) = cp.phase.next_step() {
		println!("Next:     {step}");
	}
	println!("File:     {}", store.path(network).display());
	Ok(())
}
