use anyhow::Result;
use serde_json::json;

use crate::keys::{AdminKey, ADMIN_SECRET_ENV};
use crate::network::Network;

pub fn run(json: bool, network: Network) -> Result<()> {
	let key = AdminKey::random();
	if json {
		println!("{}", serde_json::to_string_pretty(&to_json(&key))?);
	} else {
		print!("{}", render(&key, network));
	}
	Ok(())
}

fn to_json(key: &AdminKey) -> serde_json::Value {
	json!({
		"public_key": key.address(),
		"secret_hex": key.secret_hex(),
		"secret_key": key.secret_strkey(),
	})
}

fn render(key: &AdminKey, network: Network) -> String {
	format!(
		"=== NEW KEYPAIR GENERATED ===\n\
		 Public Key (Address): {address}\n\
		 Secret Key (Hex): {hex}\n\
		 Secret Key (Stellar): {secret}\n\
		 \n\
		 IMPORTANT:\n\
		 - Use the \"Secret Key (Hex)\" as {env} in your .env\n\
		 - Use the \"Public Key (Address)\" to initialize the contract\n\
		 - NEVER share the secret key; store it somewhere safe\n\
		 \n\
		 To use it on {network}, fund the account at:\n\
		 {faucet}\n",
		address = key.address(),
		hex = key.secret_hex(),
		secret = key.secret_strkey(),
		env = ADMIN_SECRET_ENV,
		faucet = network.faucet_url(),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::keys::{decode_secret_hex, decode_secret_strkey};

	#[test]
	fn output_lists_encodings_in_order() {
		let key = AdminKey::from_bytes([7; 32]);
		let out = render(&key, Network::Testnet);
		let lines: Vec<&str> = out.lines().collect();

		assert_eq!(lines[1], format!("Public Key (Address): {}", key.address()));
		assert_eq!(lines[2], format!("Secret Key (Hex): {}", "07".repeat(32)));
		assert_eq!(lines[3], format!("Secret Key (Stellar): {}", key.secret_strkey()));
		assert!(out.contains("ADMIN_SECRET_KEY"));
		assert!(out.ends_with("https://laboratory.stellar.org/#account-creator?network=test\n"));
	}

	#[test]
	fn futurenet_points_at_its_faucet() {
		let out = render(&AdminKey::from_bytes([1; 32]), Network::Futurenet);
		assert!(out.contains("network=futurenet"));
	}

	#[test]
	fn json_encodings_decode_to_same_key() {
		let key = AdminKey::random();
		let v = to_json(&key);
		let from_hex = decode_secret_hex(v["secret_hex"].as_str().unwrap()).unwrap();
		let from_strkey = decode_secret_strkey(v["secret_key"].as_str().unwrap()).unwrap();
		assert_eq!(from_hex, key.secret_bytes());
		assert_eq!(from_strkey, key.secret_bytes());
		assert_eq!(v["public_key"], key.address());
	}
}
