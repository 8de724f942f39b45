use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::deploy::CheckpointStore;
use crate::network::{Network, NetworkProfile};
use crate::tx_builder::TxSettings;

/// Default location of the compiled contract, relative to the deploy
/// tooling directory.
pub const DEFAULT_WASM_PATH: &str =
	"../contracts/target/wasm32v1-none/release/fashion_auth_contract.wasm";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub network: NetworkConfig,
	pub deploy: DeployConfig,
}

/// Endpoint overrides; unset entries use the built-in profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
	pub testnet: EndpointConfig,
	pub futurenet: EndpointConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub horizon_url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rpc_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
	/// Inclusion fee in stroops.
	pub base_fee: u32,
	/// Transaction validity window and confirmation timeout, in seconds.
	pub timeout_secs: u64,
	pub poll_interval_secs: u64,
	pub wasm_path: PathBuf,
	/// Where checkpoints live.  Defaults to `state/` under the config dir.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state_dir: Option<PathBuf>,
}

impl Default for DeployConfig {
	fn default() -> Self {
		let tx = TxSettings::default();
		Self {
			base_fee: tx.base_fee,
			timeout_secs: tx.timeout_secs,
			poll_interval_secs: 2,
			wasm_path: PathBuf::from(DEFAULT_WASM_PATH),
			state_dir: None,
		}
	}
}

impl Config {
	/// Directory where CLI state is stored (~/.veriluxe-deploy/).  Falls
	/// back to the working directory when no home directory is known.
	pub fn dir() -> PathBuf {
		dirs::home_dir()
			.unwrap_or_else(|| PathBuf::from("."))
			.join(".veriluxe-deploy")
	}

	/// Path to the config file.
	pub fn path() -> PathBuf {
		Self::dir().join("config.toml")
	}

	/// Load config from disk, falling back to defaults if no file exists.
	pub fn load() -> anyhow::Result<Self> {
		let path = Self::path();
		if path.exists() {
			let content = std::fs::read_to_string(&path)?;
			Ok(toml::from_str(&content)?)
		} else {
			Ok(Self::default())
		}
	}

	pub fn endpoints(&self, network: Network) -> &EndpointConfig {
		match network {
			Network::Testnet => &self.network.testnet,
			Network::Futurenet => &self.network.futurenet,
		}
	}

	/// Network profile with overrides applied: command-line flags win over
	/// the config file, which wins over the built-in endpoints.
	pub fn profile(
		&self,
		network: Network,
		horizon_url: Option<&str>,
		rpc_url: Option<&str>,
	) -> NetworkProfile {
		let endpoints = self.endpoints(network);
		network.profile().with_overrides(
			horizon_url.or(endpoints.horizon_url.as_deref()),
			rpc_url.or(endpoints.rpc_url.as_deref()),
		)
	}

	pub fn tx_settings(&self) -> TxSettings {
		TxSettings {
			base_fee: self.deploy.base_fee,
			timeout_secs: self.deploy.timeout_secs,
		}
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.deploy.poll_interval_secs.max(1))
	}

	pub fn confirm_timeout(&self) -> Duration {
		Duration::from_secs(self.deploy.timeout_secs)
	}

	pub fn state_dir(&self) -> PathBuf {
		self.deploy
			.state_dir
			.clone()
			.unwrap_or_else(|| Self::dir().join("state"))
	}

	pub fn checkpoint_store(&self) -> CheckpointStore {
		CheckpointStore::new(self.state_dir())
	}
}
