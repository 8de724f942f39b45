use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::warn;

use crate::cli::DeployArgs;
use crate::config::Config;
use crate::deploy::{Deployer, DeploymentResult, Initialization};
use crate::keys::{self, AdminKey, IdentitySource, ADMIN_SECRET_ENV};
use crate::rpc::RpcClient;

pub async fn run(args: &DeployArgs) -> Result<()> {
	dotenv().ok();
	let config = Config::load()?;
	let network = args.network;
	let profile = config.profile(network, args.horizon_url.as_deref(), args.rpc_url.as_deref());

	let (admin, source) = keys::resolve_admin(std::env::var(ADMIN_SECRET_ENV).ok())
		.with_context(|| format!("could not load the administrator key from {ADMIN_SECRET_ENV}"))?;

	println!("VeriLuxe deployer");
	println!("Network: {network}");
	println!("Admin:   {}", admin.address());
	match source {
		IdentitySource::Environment => println!("Using account from {ADMIN_SECRET_ENV}"),
		IdentitySource::DevelopmentMnemonic => warn_development_key(&admin),
	}

	let store = config.checkpoint_store();
	if args.fresh && store.clear(network)? {
		println!("Discarded saved progress for {network}");
	}

	let wasm = args.wasm.clone().unwrap_or_else(|| config.deploy.wasm_path.clone());
	let rpc = RpcClient::new(&profile).with_polling(config.poll_interval(), config.confirm_timeout());
	let deployer = Deployer::new(&rpc, profile, admin)
		.with_settings(config.tx_settings())
		.with_checkpoints(store);

	let result = deployer
		.deploy(&wasm)
		.await
		.with_context(|| format!("deployment to {network} failed"))?;

	print_summary(&result);
	Ok(())
}

fn warn_development_key(admin: &AdminKey) {
	warn!(admin = %admin.address(), "{ADMIN_SECRET_ENV} not set, using the shared development key");
	eprintln!("{}", "!".repeat(60));
	eprintln!("WARNING: {ADMIN_SECRET_ENV} is not set.");
	eprintln!("Falling back to the built-in development recovery phrase.");
	eprintln!("This key is public; anyone can control {}.", admin.address());
	eprintln!("Use it for local testing only. Run `veriluxe-deploy keygen`");
	eprintln!("and set {ADMIN_SECRET_ENV} before deploying anything real.");
	eprintln!("{}", "!".repeat(60));
}

fn print_summary(result: &DeploymentResult) {
	let rule = "-".repeat(50);
	println!();
	println!("Deployment summary");
	println!("{rule}");
	println!("Contract hash:    {}", result.wasm_hash);
	println!("Contract address: {}", result.contract);
	println!("Admin address:    {}", result.admin);
	println!("Network:          {}", result.network);
	match &result.initialization {
		Initialization::Completed { tx_hash } => println!("Initialized:      yes (tx {tx_hash})"),
		Initialization::Failed { reason } => println!("Initialized:      NO ({reason})"),
		Initialization::Unconfirmed { tx_hash } => {
			println!("Initialized:      UNKNOWN (tx {tx_hash} not confirmed)")
		}
	}
	println!("{rule}");

	match &result.initialization {
		Initialization::Completed { .. } => {
			println!("VeriLuxe authenticity contract deployed and ready for frontend integration.");
		}
		Initialization::Failed { .. } => {
			println!("Contract deployed but not initialized. Re-run deploy to retry initialization.");
		}
		Initialization::Unconfirmed { tx_hash } => {
			println!("Check the status of transaction {tx_hash} before re-running deploy.");
			println!("If it landed, the contract is initialized and nothing else is needed;");
			println!("a re-run would call init a second time and fail.");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn env_file_secret_resolves_admin() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join(".env");
		std::fs::write(
			&path,
			format!(
				"# deploy settings\n{ADMIN_SECRET_ENV}=4d691bc19b44a1383b1a0a130aaca3e05c3c1a371dbe45930ef9b761f7a74691\n"
			),
		)
		.unwrap();

		let secret = dotenvy::from_path_iter(&path)
			.unwrap()
			.filter_map(|item| item.ok())
			.find(|(key, _)| key == ADMIN_SECRET_ENV)
			.map(|(_, value)| value);

		let (key, source) = keys::resolve_admin(secret).unwrap();
		assert_eq!(source, IdentitySource::Environment);
		assert_eq!(
			key.address(),
			"GDRXE2BQUC3AZNPVFSCEZ76NJ3WWL25FYFK6RGZGIEKWE4SOOHSUJUJ6"
		);
	}
}
