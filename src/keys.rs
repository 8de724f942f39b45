use std::fmt;

use ed25519_dalek::{Signer as _, SigningKey};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use stellar_strkey::ed25519;
use stellar_xdr::curr::{
	AccountId, DecoratedSignature, MuxedAccount, PublicKey, ScAddress, Signature, SignatureHint,
	Transaction, TransactionEnvelope, TransactionV1Envelope, Uint256,
};

use crate::error::{Error, Result};

type HmacSha512 = Hmac<Sha512>;

/// Environment variable holding the administrator secret.
pub const ADMIN_SECRET_ENV: &str = "ADMIN_SECRET_KEY";

/// Shared development phrase used when no secret is configured.  Anyone
/// with access to this source controls the derived account.
pub const DEV_RECOVERY_PHRASE: &str = "coin idle bus total sense awful picture dial stick between erode expose stairs they swing account august indicate cruel nasty inherit vocal veteran deal";

/// SLIP-0044 coin type registered for Stellar (SEP-0005).
const STELLAR_COIN_TYPE: u32 = 148;
const HARDENED: u32 = 0x8000_0000;

/// An Ed25519 key that signs every deployment transaction.
pub struct AdminKey {
	signing: SigningKey,
}

/// Where the administrator key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
	Environment,
	DevelopmentMnemonic,
}

impl AdminKey {
	/// A fresh key from the operating system CSPRNG.
	pub fn random() -> Self {
		Self {
			signing: SigningKey::generate(&mut rand::rngs::OsRng),
		}
	}

	pub fn from_bytes(secret: [u8; 32]) -> Self {
		Self {
			signing: SigningKey::from_bytes(&secret),
		}
	}

	/// Parse either a Stellar secret strkey (`S...`) or 64 hex characters.
	pub fn from_secret(secret: &str) -> Result<Self> {
		let secret = secret.trim();
		if secret.starts_with('S') {
			decode_secret_strkey(secret).map(Self::from_bytes)
		} else if secret.len() == 64 {
			decode_secret_hex(secret).map(Self::from_bytes)
		} else {
			Err(Error::InvalidSecretKey(
				"expected a Stellar secret (S...) or 64 hex characters".into(),
			))
		}
	}

	/// Derive the account at `m/44'/148'/index'` from a BIP-39 phrase.
	pub fn from_mnemonic(phrase: &str, index: u32) -> Result<Self> {
		let mnemonic = bip39::Mnemonic::parse_in_normalized(bip39::Language::English, phrase)
			.map_err(|e| Error::Mnemonic(e.to_string()))?;
		let seed = mnemonic.to_seed("");
		let secret = derive_ed25519(&seed, &[44, STELLAR_COIN_TYPE, index]);
		Ok(Self::from_bytes(secret))
	}

	pub fn public_key_bytes(&self) -> [u8; 32] {
		self.signing.verifying_key().to_bytes()
	}

	pub fn secret_bytes(&self) -> [u8; 32] {
		self.signing.to_bytes()
	}

	/// The `G...` account address.
	pub fn address(&self) -> String {
		ed25519::PublicKey(self.public_key_bytes()).to_string()
	}

	/// The `S...` secret seed.
	pub fn secret_strkey(&self) -> String {
		ed25519::PrivateKey(self.secret_bytes()).to_string()
	}

	pub fn secret_hex(&self) -> String {
		hex::encode(self.secret_bytes())
	}

	// -- XDR views --

	pub fn muxed_account(&self) -> MuxedAccount {
		MuxedAccount::Ed25519(Uint256(self.public_key_bytes()))
	}

	pub fn sc_address(&self) -> ScAddress {
		ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(
			self.public_key_bytes(),
		))))
	}

	/// Sign the transaction hash for `network_id` and wrap the result in a
	/// v1 envelope ready for submission.
	pub fn sign(&self, tx: Transaction, network_id: [u8; 32]) -> Result<TransactionEnvelope> {
		let hash = tx.hash(network_id)?;
		let signature = self.signing.sign(&hash);
		let decorated = DecoratedSignature {
			hint: SignatureHint(self.signature_hint()),
			signature: Signature(signature.to_bytes().to_vec().try_into()?),
		};
		Ok(TransactionEnvelope::Tx(TransactionV1Envelope {
			tx,
			signatures: vec![decorated].try_into()?,
		}))
	}

	fn signature_hint(&self) -> [u8; 4] {
		let public = self.public_key_bytes();
		[public[28], public[29], public[30], public[31]]
	}
}

impl fmt::Debug for AdminKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AdminKey")
			.field("address", &self.address())
			.finish_non_exhaustive()
	}
}

/// Resolve the administrator from the configured secret, falling back to
/// the development phrase.  Blank values count as unset.
pub fn resolve_admin(env_value: Option<String>) -> Result<(AdminKey, IdentitySource)> {
	match env_value.filter(|v| !v.trim().is_empty()) {
		Some(secret) => Ok((AdminKey::from_secret(&secret)?, IdentitySource::Environment)),
		None => Ok((
			AdminKey::from_mnemonic(DEV_RECOVERY_PHRASE, 0)?,
			IdentitySource::DevelopmentMnemonic,
		)),
	}
}

// -- Secret encodings --

pub fn decode_secret_hex(s: &str) -> Result<[u8; 32]> {
	let raw = hex::decode(s).map_err(|e| Error::InvalidSecretKey(format!("bad hex: {e}")))?;
	raw.try_into()
		.map_err(|_| Error::InvalidSecretKey("secret must be 32 bytes".into()))
}

pub fn decode_secret_strkey(s: &str) -> Result<[u8; 32]> {
	ed25519::PrivateKey::from_string(s)
		.map(|k| k.0)
		.map_err(|e| Error::InvalidSecretKey(format!("bad Stellar secret: {e:?}")))
}

// -- SLIP-0010 --

/// Hardened-only SLIP-0010 derivation for Ed25519.
fn derive_ed25519(seed: &[u8], path: &[u32]) -> [u8; 32] {
	let (mut key, mut chain) = hmac_split(b"ed25519 seed", seed);
	for index in path {
		let mut data = Vec::with_capacity(37);
		data.push(0u8);
		data.extend_from_slice(&key);
		data.extend_from_slice(&(index | HARDENED).to_be_bytes());
		(key, chain) = hmac_split(&chain, &data);
	}
	key
}

fn hmac_split(key: &[u8], data: &[u8]) -> ([u8; 32], [u8; 32]) {
	let mut mac = HmacSha512::new_from_slice(key).expect("HMAC-SHA512 accepts any key length");
	mac.update(data);
	let out = mac.finalize().into_bytes();
	let mut left = [0u8; 32];
	let mut right = [0u8; 32];
	left.copy_from_slice(&out[..32]);
	right.copy_from_slice(&out[32..]);
	(left, right)
}

#[cfg(test)]
mod tests {
	use super::*;
	use ed25519_dalek::{Signature as DalekSignature, Verifier};
	use stellar_xdr::curr::{Memo, Preconditions, SequenceNumber, TransactionExt};

	/// SEP-0005 test vector 1.
	const SEP5_PHRASE: &str =
		"illness spike retreat truth genius clock brain pass fit cave bargain toe";

	#[test]
	fn sep5_vector_derives_expected_account() {
		let key = AdminKey::from_mnemonic(SEP5_PHRASE, 0).unwrap();
		assert_eq!(
			key.address(),
			"GDRXE2BQUC3AZNPVFSCEZ76NJ3WWL25FYFK6RGZGIEKWE4SOOHSUJUJ6"
		);
		assert_eq!(
			key.secret_strkey(),
			"SBGWSG6BTNCKCOB3DIFBGCVMUPQFYPA2G4O34RMTB343OYPXU5DJDVMN"
		);
	}

	#[test]
	fn development_phrase_derives_fixed_account() {
		let (key, source) = resolve_admin(None).unwrap();
		assert_eq!(source, IdentitySource::DevelopmentMnemonic);
		assert_eq!(
			key.address(),
			"GAE4GSKFNNLO3DWX2ABGJS4NKL2K645WTPSYJBLXO6GHP7ULWAXTF63F"
		);
		assert_eq!(
			key.secret_hex(),
			"3fbd6db2f79385dd5532a3534344c2fb59bad85a567970e541c2e4554824d14c"
		);

		let (again, _) = resolve_admin(None).unwrap();
		assert_eq!(again.secret_bytes(), key.secret_bytes());
	}

	#[test]
	fn environment_secret_takes_precedence() {
		let secret = "SBGWSG6BTNCKCOB3DIFBGCVMUPQFYPA2G4O34RMTB343OYPXU5DJDVMN";
		let (key, source) = resolve_admin(Some(secret.into())).unwrap();
		assert_eq!(source, IdentitySource::Environment);
		assert_eq!(
			key.address(),
			"GDRXE2BQUC3AZNPVFSCEZ76NJ3WWL25FYFK6RGZGIEKWE4SOOHSUJUJ6"
		);
	}

	#[test]
	fn environment_secret_accepts_hex() {
		let hex_secret = "4d691bc19b44a1383b1a0a130aaca3e05c3c1a371dbe45930ef9b761f7a74691";
		let (key, _) = resolve_admin(Some(hex_secret.into())).unwrap();
		assert_eq!(
			key.address(),
			"GDRXE2BQUC3AZNPVFSCEZ76NJ3WWL25FYFK6RGZGIEKWE4SOOHSUJUJ6"
		);
	}

	#[test]
	fn blank_environment_value_falls_back() {
		let (_, source) = resolve_admin(Some("   ".into())).unwrap();
		assert_eq!(source, IdentitySource::DevelopmentMnemonic);
	}

	#[test]
	fn malformed_secrets_are_rejected() {
		for bad in ["GDRXE2BQUC3AZNPVFSCEZ76NJ3WWL25FYFK6RGZGIEKWE4SOOHSUJUJ6", "abc", "S123"] {
			assert!(matches!(
				AdminKey::from_secret(bad),
				Err(Error::InvalidSecretKey(_))
			));
		}
		let not_hex = "z".repeat(64);
		assert!(AdminKey::from_secret(&not_hex).is_err());
	}

	#[test]
	fn bad_checksum_phrase_is_rejected() {
		let phrase = SEP5_PHRASE.replace("toe", "zoo");
		assert!(matches!(
			AdminKey::from_mnemonic(&phrase, 0),
			Err(Error::Mnemonic(_))
		));
	}

	#[test]
	fn random_keys_are_unique() {
		let a = AdminKey::random();
		let b = AdminKey::random();
		assert_ne!(a.public_key_bytes(), b.public_key_bytes());
	}

	#[test]
	fn hex_and_strkey_encodings_agree() {
		let key = AdminKey::random();
		let from_hex = decode_secret_hex(&key.secret_hex()).unwrap();
		let from_strkey = decode_secret_strkey(&key.secret_strkey()).unwrap();
		assert_eq!(from_hex, key.secret_bytes());
		assert_eq!(from_strkey, key.secret_bytes());
		assert!(key.address().starts_with('G'));
		assert!(key.secret_strkey().starts_with('S'));
	}

	#[test]
	fn signature_covers_transaction_hash() {
		let key = AdminKey::random();
		let network_id = [7u8; 32];
		let tx = Transaction {
			source_account: key.muxed_account(),
			fee: 100,
			seq_num: SequenceNumber(1),
			cond: Preconditions::None,
			memo: Memo::None,
			operations: Vec::new().try_into().unwrap(),
			ext: TransactionExt::V0,
		};
		let hash = tx.hash(network_id).unwrap();

		let TransactionEnvelope::Tx(env) = key.sign(tx, network_id).unwrap() else {
			panic!("expected a v1 envelope");
		};
		assert_eq!(env.signatures.len(), 1);
		let sig = &env.signatures[0];
		assert_eq!(sig.hint.0, key.public_key_bytes()[28..]);

		let raw: [u8; 64] = sig.signature.0.to_vec().try_into().unwrap();
		key.signing
			.verifying_key()
			.verify(&hash, &DalekSignature::from_bytes(&raw))
			.expect("signature should verify");
	}
}
