use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Error;

/// Stellar networks the contract can be deployed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
	Testnet,
	Futurenet,
}

impl Network {
	pub const ALL: [Network; 2] = [Network::Testnet, Network::Futurenet];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Testnet => "testnet",
			Self::Futurenet => "futurenet",
		}
	}

	/// The built-in endpoints and passphrase for this network.
	pub fn profile(&self) -> NetworkProfile {
		match self {
			Self::Testnet => NetworkProfile {
				network: *self,
				horizon_url: "https://horizon-testnet.stellar.org".into(),
				rpc_url: "https://soroban-testnet.stellar.org".into(),
				passphrase: "Test SDF Network ; September 2015",
			},
			Self::Futurenet => NetworkProfile {
				network: *self,
				horizon_url: "https://horizon-futurenet.stellar.org".into(),
				rpc_url: "https://rpc-futurenet.stellar.org:443".into(),
				passphrase: "Test SDF Future Network ; October 2022",
			},
		}
	}

	/// Where an operator can create and fund a fresh account.
	pub fn faucet_url(&self) -> &'static str {
		match self {
			Self::Testnet => "https://laboratory.stellar.org/#account-creator?network=test",
			Self::Futurenet => "https://laboratory.stellar.org/#account-creator?network=futurenet",
		}
	}
}

impl fmt::Display for Network {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Network {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"testnet" => Ok(Self::Testnet),
			"futurenet" => Ok(Self::Futurenet),
			_ => Err(Error::UnsupportedNetwork(s.to_owned())),
		}
	}
}

/// Endpoints and identity of one network.  URLs can be overridden from
/// config or the command line; the passphrase cannot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
	pub network: Network,
	/// Horizon: account lookups.
	pub horizon_url: String,
	/// Soroban RPC: simulation and submission.
	pub rpc_url: String,
	pub passphrase: &'static str,
}

impl NetworkProfile {
	/// SHA-256 of the passphrase, mixed into every signature payload and
	/// contract-id preimage.
	pub fn network_id(&self) -> [u8; 32] {
		Sha256::digest(self.passphrase.as_bytes()).into()
	}

	pub fn with_overrides(mut self, horizon_url: Option<&str>, rpc_url: Option<&str>) -> Self {
		if let Some(url) = horizon_url {
			self.horizon_url = url.trim_end_matches('/').to_owned();
		}
		if let Some(url) = rpc_url {
			self.rpc_url = url.trim_end_matches('/').to_owned();
		}
		self
	}
}
