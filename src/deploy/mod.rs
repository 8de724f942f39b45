pub mod checkpoint;
pub mod phase;


use std::path::{Path, PathBuf};

use stellar_xdr::curr::{ContractId, Hash, ScAddress, ScVal, Transaction};
use tracing::{info, warn};

pub use checkpoint::{Checkpoint, CheckpointStore};
pub use phase::{ContractAddress, Phase, Step, WasmHash};

use crate::error::{Error, Result};
use crate::keys::AdminKey;
use crate::ledger::{Account, Ledger, Simulation, TxStatus};
use crate::network::{Network, NetworkProfile};
use crate::tx_builder::{self, TxSettings};

/// Compiled contract bytecode read from disk.
#[derive(Debug, Clone)]
pub struct ContractBinary {
	pub path: PathBuf,
	pub bytes: Vec<u8>,
	pub hash: WasmHash,
}

impl ContractBinary {
	pub fn read(path: &Path) -> Result<Self> {
		let bytes = std::fs::read(path).map_err(|e| match e.kind() {
			std::io::ErrorKind::NotFound => Error::WasmNotFound(path.to_owned()),
			_ => Error::Io(e),
		})?;
		Ok(Self {
			path: path.to_owned(),
			hash: WasmHash(tx_builder::wasm_hash(&bytes)),
			bytes,
		})
	}
}

/// Outcome of the `init` call.  A failed initialization leaves a live
/// contract behind, so it is reported rather than treated as fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Initialization {
	Completed { tx_hash: String },
	Failed { reason: String },
	/// Submitted but not final before the timeout; it may still land.
	Unconfirmed { tx_hash: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
	pub wasm_hash: WasmHash,
	pub contract: ContractAddress,
	pub admin: String,
	pub network: Network,
	pub initialization: Initialization,
}

impl DeploymentResult {
	pub fn is_initialized(&self) -> bool {
		matches!(self.initialization, Initialization::Completed { .. })
	}
}

/// Drives upload -> create -> initialize against a `Ledger`, reloading the
/// admin account before every transaction.
pub struct Deployer<'a> {
	ledger: &'a dyn Ledger,
	profile: NetworkProfile,
	admin: AdminKey,
	settings: TxSettings,
	checkpoints: Option<CheckpointStore>,
}

impl<'a> Deployer<'a> {
	pub fn new(ledger: &'a dyn Ledger, profile: NetworkProfile, admin: AdminKey) -> Self {
		Self {
			ledger,
			profile,
			admin,
			settings: TxSettings::default(),
			checkpoints: None,
		}
	}

	pub fn with_settings(mut self, settings: TxSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Record progress in `store` and resume from a matching checkpoint.
	pub fn with_checkpoints(mut self, store: CheckpointStore) -> Self {
		self.checkpoints = Some(store);
		self
	}

	/// Read the binary at `wasm_path` and deploy it.  Nothing touches the
	/// network until the file has been read in full.
	pub async fn deploy(&self, wasm_path: &Path) -> Result<DeploymentResult> {
		let binary = ContractBinary::read(wasm_path)?;
		println!(
			"Loaded WASM file {} ({} bytes)",
			binary.path.display(),
			binary.bytes.len()
		);
		self.deploy_binary(&binary).await
	}

	pub async fn deploy_binary(&self, binary: &ContractBinary) -> Result<DeploymentResult> {
		let mut phase = self.resume_point(binary)?;

		loop {
			phase = match phase {
				Phase::Pending => Phase::Uploaded {
					wasm_hash: self.upload(binary).await?,
				},
				Phase::Uploaded { wasm_hash } => Phase::Instantiated {
					contract: self.create(&wasm_hash).await?,
					wasm_hash,
				},
				Phase::Instantiated {
					wasm_hash,
					contract,
				} => match self.initialize(&contract).await {
					Ok(init_tx) => Phase::Initialized {
						wasm_hash,
						contract,
						init_tx,
					},
					Err(Error::Unconfirmed { hash, .. }) => {
						warn!(%hash, %contract, "initialization outcome unknown");
						println!("WARNING: initialization transaction {hash} was not confirmed in time");
						return Ok(self.result(
							wasm_hash,
							contract,
							Initialization::Unconfirmed { tx_hash: hash },
						));
					}
					Err(e) => {
						warn!(error = %e, %contract, "contract deployed but not initialized");
						println!("WARNING: contract initialization failed: {e}");
						return Ok(self.result(
							wasm_hash,
							contract,
							Initialization::Failed {
								reason: e.to_string(),
							},
						));
					}
				},
				Phase::Initialized {
					wasm_hash,
					contract,
					init_tx,
				} => {
					return Ok(self.result(
						wasm_hash,
						contract,
						Initialization::Completed { tx_hash: init_tx },
					))
				}
			};
			info!(phase = phase.label(), "phase reached");
			self.record(binary, &phase);
		}
	}

	// -- Steps --

	async fn upload(&self, binary: &ContractBinary) -> Result<WasmHash> {
		println!("Uploading contract WASM...");
		let account = self.load_account().await?;
		let tx = tx_builder::build_upload(&self.admin, &account, &self.settings, &binary.bytes)?;
		let sim = self.simulate(Step::Upload, &tx).await?;

		let reported = match &sim.result {
			Some(ScVal::Bytes(b)) => <[u8; 32]>::try_from(b.as_slice()).ok(),
			_ => None,
		};
		if let Some(reported) = reported.filter(|h| *h != binary.hash.0) {
			return Err(Error::Submission {
				step: Step::Upload,
				reason: format!(
					"network reported wasm hash {}, expected {}",
					WasmHash(reported),
					binary.hash
				),
			});
		}

		let tx_hash = self.submit(Step::Upload, tx, &sim).await?;
		println!("Contract WASM uploaded (tx {tx_hash})");
		println!("Contract hash: {}", binary.hash);
		Ok(binary.hash)
	}

	async fn create(&self, wasm_hash: &WasmHash) -> Result<ContractAddress> {
		println!("Creating contract instance...");
		let account = self.load_account().await?;
		let salt: [u8; 32] = rand::random();
		let expected = ContractAddress(tx_builder::contract_id_for(
			self.profile.network_id(),
			&self.admin,
			salt,
		)?);

		let tx = tx_builder::build_create(&self.admin, &account, &self.settings, wasm_hash.0, salt)?;
		let sim = self.simulate(Step::Create, &tx).await?;

		if let Some(ScVal::Address(ScAddress::Contract(ContractId(Hash(id))))) = &sim.result {
			if *id != expected.0 {
				return Err(Error::Submission {
					step: Step::Create,
					reason: format!(
						"network reported contract {}, expected {expected}",
						ContractAddress(*id)
					),
				});
			}
		}

		let tx_hash = self.submit(Step::Create, tx, &sim).await?;
		println!("Contract instance created (tx {tx_hash})");
		println!("Contract address: {expected}");
		Ok(expected)
	}

	async fn initialize(&self, contract: &ContractAddress) -> Result<String> {
		println!("Initializing contract...");
		let account = self.load_account().await?;
		let tx = tx_builder::build_init(&self.admin, &account, &self.settings, contract.0)?;
		let sim = self.simulate(Step::Initialize, &tx).await?;
		let tx_hash = self.submit(Step::Initialize, tx, &sim).await?;
		println!("Contract initialized (tx {tx_hash})");
		Ok(tx_hash)
	}

	// -- Helpers --

	async fn load_account(&self) -> Result<Account> {
		let account = self.ledger.load_account(&self.admin.address()).await?;
		info!(phase = "ACCOUNT_LOADED", sequence = account.sequence, "account loaded");
		println!("Account loaded with sequence: {}", account.sequence);
		Ok(account)
	}

	/// Dry-run `tx`.  Its results are checked before anything is signed.
	async fn simulate(&self, step: Step, tx: &Transaction) -> Result<Simulation> {
		self.ledger.simulate(tx).await.map_err(|e| match e {
			Error::Simulation(reason) => Error::Submission {
				step,
				reason: format!("simulation rejected the transaction: {reason}"),
			},
			other => refused(step, other),
		})
	}

	/// Assemble, sign, and submit one transaction.  Returns its hash.
	async fn submit(&self, step: Step, tx: Transaction, sim: &Simulation) -> Result<String> {
		let tx = tx_builder::assemble(tx, sim)?;
		let envelope = self.admin.sign(tx, self.profile.network_id())?;
		let submission = self
			.ledger
			.submit(&envelope)
			.await
			.map_err(|e| refused(step, e))?;

		match submission.status {
			TxStatus::Success => Ok(submission.hash),
			TxStatus::Failed(reason) => Err(Error::Submission { step, reason }),
			TxStatus::Unconfirmed => Err(Error::Unconfirmed {
				step,
				hash: submission.hash,
			}),
		}
	}

	fn resume_point(&self, binary: &ContractBinary) -> Result<Phase> {
		let Some(store) = &self.checkpoints else {
			return Ok(Phase::Pending);
		};
		let network = self.profile.network;
		let admin = self.admin.address();

		match store.load(network)? {
			Some(cp) if cp.matches(network, &admin, &binary.hash) => {
				info!(phase = cp.phase.label(), "resuming from checkpoint");
				println!("Resuming from checkpoint ({})", cp.phase.label());
				Ok(cp.phase)
			}
			Some(cp) => {
				info!(
					checkpoint_wasm = %cp.wasm,
					wasm = %binary.hash,
					"checkpoint belongs to another deployment, starting over"
				);
				Ok(Phase::Pending)
			}
			None => Ok(Phase::Pending),
		}
	}

	fn record(&self, binary: &ContractBinary, phase: &Phase) {
		let Some(store) = &self.checkpoints else {
			return;
		};
		let cp = Checkpoint::new(
			self.profile.network,
			&self.admin.address(),
			binary.hash,
			phase.clone(),
		);
		if let Err(e) = store.save(&cp) {
			warn!(error = %e, "could not write deployment checkpoint");
			println!(
				"WARNING: could not save progress ({e}); a re-run will not know the deployment reached {}",
				phase.label()
			);
		}
	}

	fn result(
		&self,
		wasm_hash: WasmHash,
		contract: ContractAddress,
		initialization: Initialization,
	) -> DeploymentResult {
		DeploymentResult {
			wasm_hash,
			contract,
			admin: self.admin.address(),
			network: self.profile.network,
			initialization,
		}
	}
}

/// A node that answered with an error refused the transaction.
fn refused(step: Step, e: Error) -> Error {
	match e {
		Error::Rpc { method, message } => Error::Submission {
			step,
			reason: format!("{method} refused: {message}"),
		},
		other => other,
	}
}
