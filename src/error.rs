use std::path::PathBuf;

use crate::deploy::Step;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unsupported network: {0} (expected testnet or futurenet)")]
	UnsupportedNetwork(String),

	#[error("WASM file not found: {}", .0.display())]
	WasmNotFound(PathBuf),

	#[error("invalid admin secret key: {0}")]
	InvalidSecretKey(String),

	#[error("invalid recovery phrase: {0}")]
	Mnemonic(String),

	#[error("account {0} not found on the ledger (is it funded?)")]
	AccountNotFound(String),

	#[error("network request failed: {0}")]
	Network(String),

	/// The node answered, but with a JSON-RPC error object.
	#[error("{method} was refused by the node: {message}")]
	Rpc { method: String, message: String },

	#[error("transaction simulation failed: {0}")]
	Simulation(String),

	#[error("{step} failed: {reason}")]
	Submission { step: Step, reason: String },

	#[error("{step} transaction {hash} was not confirmed in time; its outcome is unknown")]
	Unconfirmed { step: Step, hash: String },

	#[error("malformed XDR: {0}")]
	Xdr(#[from] stellar_xdr::curr::Error),

	#[error("checkpoint {}: {reason}", path.display())]
	Checkpoint { path: PathBuf, reason: String },

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
	fn from(e: reqwest::Error) -> Self {
		Self::Network(e.to_string())
	}
}
