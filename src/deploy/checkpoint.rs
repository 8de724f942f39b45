use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::{Phase, WasmHash};
use crate::error::{Error, Result};
use crate::network::Network;

/// Progress of the last deployment on one network, persisted after every
/// completed step so an interrupted run resumes instead of redeploying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
	pub network: Network,
	pub admin: String,
	/// Digest of the binary being deployed; a rebuilt contract starts over.
	pub wasm: WasmHash,
	pub updated_at: DateTime<Utc>,
	pub phase: Phase,
}

impl Checkpoint {
	pub fn new(network: Network, admin: &str, wasm: WasmHash, phase: Phase) -> Self {
		Self {
			network,
			admin: admin.to_owned(),
			wasm,
			updated_at: Utc::now(),
			phase,
		}
	}

	/// Whether this checkpoint belongs to the same deployment.
	pub fn matches(&self, network: Network, admin: &str, wasm: &WasmHash) -> bool {
		self.network == network && self.admin == admin && &self.wasm == wasm
	}
}

/// One TOML file per network under a state directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
	dir: PathBuf,
}

impl CheckpointStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn path(&self, network: Network) -> PathBuf {
		self.dir.join(format!("{network}.toml"))
	}

	/// Load the checkpoint for `network`, or `None` if no file exists.
	pub fn load(&self, network: Network) -> Result<Option<Checkpoint>> {
		let path = self.path(network);
		if !path.exists() {
			return Ok(None);
		}
		let content = std::fs::read_to_string(&path).map_err(|e| checkpoint_err(&path, e))?;
		let checkpoint = toml::from_str(&content).map_err(|e| checkpoint_err(&path, e))?;
		Ok(Some(checkpoint))
	}

	/// Persist a checkpoint, creating the state directory if needed.
	pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
		let path = self.path(checkpoint.network);
		std::fs::create_dir_all(&self.dir).map_err(|e| checkpoint_err(&path, e))?;
		let content = toml::to_string_pretty(checkpoint).map_err(|e| checkpoint_err(&path, e))?;
		std::fs::write(&path, content).map_err(|e| checkpoint_err(&path, e))
	}

	/// Remove the checkpoint for `network`.  Returns whether one existed.
	pub fn clear(&self, network: Network) -> Result<bool> {
		let path = self.path(network);
		match std::fs::remove_file(&path) {
			Ok(()) => Ok(true),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
			Err(e) => Err(checkpoint_err(&path, e)),
		}
	}
}

fn checkpoint_err(path: &Path, e: impl std::fmt::Display) -> Error {
	Error::Checkpoint {
		path: path.to_owned(),
		reason: e.to_string(),
	}
}
