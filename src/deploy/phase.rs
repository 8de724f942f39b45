use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One remote operation of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
	Upload,
	Create,
	Initialize,
}

impl fmt::Display for Step {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Upload => "upload",
			Self::Create => "contract creation",
			Self::Initialize => "initialization",
		})
	}
}

/// How far a deployment has progressed.  Each variant carries what the
/// next step needs, so a phase can only be reached with its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reached", rename_all = "snake_case")]
pub enum Phase {
	Pending,
	Uploaded {
		wasm_hash: WasmHash,
	},
	Instantiated {
		wasm_hash: WasmHash,
		contract: ContractAddress,
	},
	Initialized {
		wasm_hash: WasmHash,
		contract: ContractAddress,
		init_tx: String,
	},
}

impl Phase {
	pub fn next_step(&self) -> Option<Step> {
		match self {
			Self::Pending => Some(Step::Upload),
			Self::Uploaded { .. } => Some(Step::Create),
			Self::Instantiated { .. } => Some(Step::Initialize),
			Self::Initialized { .. } => None,
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::Pending => "INIT",
			Self::Uploaded { .. } => "UPLOADED",
			Self::Instantiated { .. } => "INSTANTIATED",
			Self::Initialized { .. } => "INITIALIZED",
		}
	}
}

// -- Identifiers --

/// SHA-256 of uploaded contract bytecode, shown as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WasmHash(pub [u8; 32]);

/// A contract address, shown as a `C...` strkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractAddress(pub [u8; 32]);

impl fmt::Display for WasmHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&hex::encode(self.0))
	}
}

impl FromStr for WasmHash {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let raw = hex::decode(s).map_err(|e| format!("invalid wasm hash: {e}"))?;
		raw.try_into()
			.map(Self)
			.map_err(|_| "wasm hash must be 32 bytes".to_owned())
	}
}

impl fmt::Display for ContractAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&stellar_strkey::Contract(self.0).to_string())
	}
}

impl FromStr for ContractAddress {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		stellar_strkey::Contract::from_string(s)
			.map(|c| Self(c.0))
			.map_err(|e| format!("invalid contract address {s}: {e:?}"))
	}
}

macro_rules! string_serde {
	($ty:ty) => {
		impl Serialize for $ty {
			fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
				s.collect_str(self)
			}
		}

		impl<'de> Deserialize<'de> for $ty {
			fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
				let s = String::deserialize(d)?;
				s.parse().map_err(serde::de::Error::custom)
			}
		}
	};
}

string_serde!(WasmHash);
string_serde!(ContractAddress);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn steps_follow_phase_order() {
		let hash = WasmHash([1; 32]);
		let contract = ContractAddress([2; 32]);
		let phases = [
			Phase::Pending,
			Phase::Uploaded { wasm_hash: hash },
			Phase::Instantiated {
				wasm_hash: hash,
				contract,
			},
			Phase::Initialized {
				wasm_hash: hash,
				contract,
				init_tx: "ab".into(),
			},
		];
		let steps: Vec<_> = phases.iter().map(Phase::next_step).collect();
		assert_eq!(
			steps,
			[Some(Step::Upload), Some(Step::Create), Some(Step::Initialize), None]
		);
	}

	#[test]
	fn contract_address_uses_c_strkey() {
		let addr = ContractAddress([0; 32]);
		let s = addr.to_string();
		assert!(s.starts_with('C'));
		assert_eq!(s.len(), 56);
		assert_eq!(s.parse::<ContractAddress>().unwrap(), addr);
	}

	#[test]
	fn wasm_hash_rejects_wrong_length() {
		assert!("abcd".parse::<WasmHash>().is_err());
		assert!("zz".repeat(32).parse::<WasmHash>().is_err());
		let h = WasmHash([0xab; 32]);
		assert_eq!(h.to_string().parse::<WasmHash>().unwrap(), h);
	}

	#[test]
	fn phase_serializes_with_tag() {
		let phase = Phase::Uploaded {
			wasm_hash: WasmHash([0; 32]),
		};
		let json = serde_json::to_value(&phase).unwrap();
		assert_eq!(json["reached"], "uploaded");
		assert_eq!(json["wasm_hash"], "00".repeat(32));
	}
}
