use stellar_xdr::curr::{
	ScVal, SorobanAuthorizationEntry, SorobanTransactionData, Transaction, TransactionEnvelope,
};

use crate::error::Result;

/// On-chain state of the source account needed to build a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
	pub address: String,
	pub sequence: i64,
}

/// What the RPC node reports for a dry run of an unsigned transaction.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
	pub transaction_data: SorobanTransactionData,
	pub min_resource_fee: u64,
	pub auth: Vec<SorobanAuthorizationEntry>,
	/// Return value of the host function, when the node provides one.
	pub result: Option<ScVal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
	Success,
	Failed(String),
	/// Still not final when the confirmation timeout ran out.
	Unconfirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
	pub hash: String,
	pub status: TxStatus,
}

impl Submission {
	pub fn is_success(&self) -> bool {
		self.status == TxStatus::Success
	}
}

/// Everything the deployer needs from the network.  Transport failures
/// are errors; a transaction the network refused is an `Ok` submission
/// with a failed status.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
	/// Fetch the account's current sequence number.
	async fn load_account(&self, address: &str) -> Result<Account>;

	/// Dry-run an unsigned transaction to learn its footprint, fees, and
	/// authorization requirements.
	async fn simulate(&self, tx: &Transaction) -> Result<Simulation>;

	/// Submit a signed envelope and wait until it is final.
	async fn submit(&self, envelope: &TransactionEnvelope) -> Result<Submission>;
}
