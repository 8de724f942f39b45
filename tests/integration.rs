//! Integration tests that hit the public Stellar testnet.
//!
//! These are marked `#[ignore]` by default because they require network
//! access. Run them explicitly with:
//!
//!   cargo test --test integration -- --ignored

use veriluxe_deploy::error::Error;
use veriluxe_deploy::keys::AdminKey;
use veriluxe_deploy::ledger::{Account, Ledger};
use veriluxe_deploy::network::Network;
use veriluxe_deploy::rpc::RpcClient;
use veriluxe_deploy::tx_builder::{self, TxSettings};

fn testnet() -> RpcClient {
	RpcClient::new(&Network::Testnet.profile())
}

#[tokio::test]
#[ignore]
async fn fresh_key_has_no_account() {
	let key = AdminKey::random();
	let err = testnet()
		.load_account(&key.address())
		.await
		.expect_err("a random key should not be funded");
	assert!(
		matches!(err, Error::AccountNotFound(_)),
		"expected AccountNotFound, got {err}"
	);
}

#[tokio::test]
#[ignore]
async fn upload_simulation_reports_resource_fee() {
	// Simulation does not check the source account's balance, only that the
	// transaction is well formed, so any key works here.
	let key = AdminKey::random();
	let account = Account {
		address: key.address(),
		sequence: 0,
	};
	let wasm = b"\0asm\x01\0\0\0".to_vec();
	let tx = tx_builder::build_upload(&key, &account, &TxSettings::default(), &wasm)
		.expect("failed to build upload");

	match testnet().simulate(&tx).await {
		Ok(sim) => assert!(sim.min_resource_fee > 0, "simulation should charge resources"),
		// An unfunded source may be refused outright; that still proves the
		// request round-tripped through the node.
		Err(Error::Simulation(reason)) => assert!(!reason.is_empty()),
		Err(other) => panic!("unexpected error: {other}"),
	}
}

#[tokio::test]
#[ignore]
async fn futurenet_horizon_is_reachable() {
	let key = AdminKey::random();
	let result = RpcClient::new(&Network::Futurenet.profile())
		.load_account(&key.address())
		.await;
	assert!(
		!matches!(result, Err(Error::Network(_))),
		"futurenet horizon should answer, got {result:?}"
	);
}
