use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
	ContractExecutable, ContractId, ContractIdPreimage, ContractIdPreimageFromAddress,
	CreateContractArgs, Hash, HashIdPreimage, HashIdPreimageContractId, HostFunction,
	InvokeContractArgs, InvokeHostFunctionOp, Limits, Memo, Operation, OperationBody,
	Preconditions, ScAddress, ScSymbol, ScVal, SequenceNumber, TimeBounds, TimePoint, Transaction,
	TransactionExt, Uint256, WriteXdr,
};

use crate::error::Result;
use crate::keys::AdminKey;
use crate::ledger::{Account, Simulation};

/// Entry point invoked on the freshly created contract.
pub const INIT_FUNCTION: &str = "init";

/// Fee and validity window applied to every deployment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxSettings {
	/// Inclusion fee in stroops, before the simulated resource fee is added.
	pub base_fee: u32,
	/// Seconds from build time until the transaction expires.
	pub timeout_secs: u64,
}

impl Default for TxSettings {
	fn default() -> Self {
		Self {
			base_fee: 100_000,
			timeout_secs: 300,
		}
	}
}

/// Build an unsigned transaction that uploads the contract bytecode.
pub fn build_upload(
	admin: &AdminKey,
	account: &Account,
	settings: &TxSettings,
	wasm: &[u8],
) -> Result<Transaction> {
	let function = HostFunction::UploadContractWasm(wasm.to_vec().try_into()?);
	single_op(admin, account, settings, function)
}

/// Build an unsigned transaction that instantiates a contract from an
/// uploaded bytecode hash, with the admin account as deployer.
pub fn build_create(
	admin: &AdminKey,
	account: &Account,
	settings: &TxSettings,
	wasm_hash: [u8; 32],
	salt: [u8; 32],
) -> Result<Transaction> {
	let function = HostFunction::CreateContract(CreateContractArgs {
		contract_id_preimage: contract_preimage(admin, salt),
		executable: ContractExecutable::Wasm(Hash(wasm_hash)),
	});
	single_op(admin, account, settings, function)
}

/// Build an unsigned transaction calling `init(admin)` on the contract.
pub fn build_init(
	admin: &AdminKey,
	account: &Account,
	settings: &TxSettings,
	contract_id: [u8; 32],
) -> Result<Transaction> {
	let function = HostFunction::InvokeContract(InvokeContractArgs {
		contract_address: ScAddress::Contract(ContractId(Hash(contract_id))),
		function_name: ScSymbol(INIT_FUNCTION.try_into()?),
		args: vec![ScVal::Address(admin.sc_address())].try_into()?,
	});
	single_op(admin, account, settings, function)
}

/// Fold a simulation into the transaction: resource footprint, auth
/// entries, and the resource fee on top of the inclusion fee.
pub fn assemble(mut tx: Transaction, sim: &Simulation) -> Result<Transaction> {
	let mut ops = tx.operations.to_vec();
	if let Some(Operation {
		body: OperationBody::InvokeHostFunction(op),
		..
	}) = ops.first_mut()
	{
		if op.auth.is_empty() {
			op.auth = sim.auth.clone().try_into()?;
		}
	}
	tx.operations = ops.try_into()?;

	let resource_fee = u32::try_from(sim.min_resource_fee).unwrap_or(u32::MAX);
	tx.fee = tx.fee.saturating_add(resource_fee);
	tx.ext = TransactionExt::V1(sim.transaction_data.clone());
	Ok(tx)
}

/// The host function carried by a single-operation deployment transaction.
pub fn host_function(tx: &Transaction) -> Option<&HostFunction> {
	match tx.operations.first().map(|op| &op.body) {
		Some(OperationBody::InvokeHostFunction(op)) => Some(&op.host_function),
		_ => None,
	}
}

/// Address the network will assign to a contract created by `admin`
/// with `salt` on the network identified by `network_id`.
pub fn contract_id_for(network_id: [u8; 32], admin: &AdminKey, salt: [u8; 32]) -> Result<[u8; 32]> {
	let preimage = HashIdPreimage::ContractId(HashIdPreimageContractId {
		network_id: Hash(network_id),
		contract_id_preimage: contract_preimage(admin, salt),
	});
	Ok(Sha256::digest(preimage.to_xdr(Limits::none())?).into())
}

/// Hash the network assigns to uploaded bytecode.
pub fn wasm_hash(wasm: &[u8]) -> [u8; 32] {
	Sha256::digest(wasm).into()
}

// -- Helpers --

fn contract_preimage(admin: &AdminKey, salt: [u8; 32]) -> ContractIdPreimage {
	ContractIdPreimage::Address(ContractIdPreimageFromAddress {
		address: admin.sc_address(),
		salt: Uint256(salt),
	})
}

fn single_op(
	admin: &AdminKey,
	account: &Account,
	settings: &TxSettings,
	host_function: HostFunction,
) -> Result<Transaction> {
	let op = Operation {
		source_account: None,
		body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
			host_function,
			auth: Vec::new().try_into()?,
		}),
	};

	let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
	Ok(Transaction {
		source_account: admin.muxed_account(),
		fee: settings.base_fee,
		seq_num: SequenceNumber(account.sequence + 1),
		cond: Preconditions::Time(TimeBounds {
			min_time: TimePoint(0),
			max_time: TimePoint(now + settings.timeout_secs),
		}),
		memo: Memo::None,
		operations: vec![op].try_into()?,
		ext: TransactionExt::V0,
	})
}
