use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json as json_val, Value};
use stellar_xdr::curr::{
	Limits, ReadXdr, ScVal, SorobanAuthorizationEntry, SorobanTransactionData, Transaction,
	TransactionEnvelope, WriteXdr,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::ledger::{Account, Ledger, Simulation, Submission, TxStatus};
use crate::network::NetworkProfile;

/// Talks to Horizon for account lookups and to Soroban RPC for
/// simulation and submission.
///
/// Soroban RPC calls go out as raw JSON-RPC; transactions and results
/// travel as base64 XDR and are decoded with `stellar-xdr`.
pub struct RpcClient {
	horizon_url: String,
	rpc_url: String,
	http: reqwest::Client,
	poll_interval: Duration,
	confirm_timeout: Duration,
}

impl RpcClient {
	pub fn new(profile: &NetworkProfile) -> Self {
		Self {
			horizon_url: profile.horizon_url.trim_end_matches('/').to_owned(),
			rpc_url: profile.rpc_url.clone(),
			http: reqwest::Client::new(),
			poll_interval: Duration::from_secs(2),
			confirm_timeout: Duration::from_secs(300),
		}
	}

	/// How often `getTransaction` is polled and how long to wait for a
	/// submitted transaction to become final.
	pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
		self.poll_interval = interval;
		self.confirm_timeout = timeout;
		self
	}

	// -- Soroban JSON-RPC --

	async fn call(&self, method: &str, params: Value) -> Result<Value> {
		let body = json_val!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params
		});
		debug!(method, url = %self.rpc_url, "soroban rpc request");

		let resp = self.http.post(&self.rpc_url).json(&body).send().await?;
		if !resp.status().is_success() {
			return Err(Error::Network(format!(
				"{method} returned HTTP {}",
				resp.status()
			)));
		}
		let resp: Value = resp.json().await?;

		if let Some(result) = resp.get("result") {
			return Ok(result.clone());
		}
		match resp.get("error") {
			Some(err) => Err(Error::Rpc {
				method: method.to_owned(),
				message: err
					.get("message")
					.and_then(Value::as_str)
					.map(str::to_owned)
					.unwrap_or_else(|| err.to_string()),
			}),
			None => Err(Error::Network(format!(
				"{method} response has neither result nor error"
			))),
		}
	}

	async fn send_transaction(&self, envelope_xdr: &str) -> Result<Value> {
		self.call("sendTransaction", json_val!({ "transaction": envelope_xdr }))
			.await
	}

	async fn get_transaction(&self, hash: &str) -> Result<Value> {
		self.call("getTransaction", json_val!({ "hash": hash })).await
	}

	/// Poll until the transaction leaves NOT_FOUND or the timeout expires.
	async fn wait_for(&self, hash: &str) -> Result<TxStatus> {
		let deadline = tokio::time::Instant::now() + self.confirm_timeout;
		loop {
			let result = self.get_transaction(hash).await?;
			match result.get("status").and_then(Value::as_str) {
				Some("SUCCESS") => return Ok(TxStatus::Success),
				Some("FAILED") => {
					let detail = result
						.get("resultXdr")
						.and_then(Value::as_str)
						.unwrap_or("no result");
					return Ok(TxStatus::Failed(format!("transaction failed: {detail}")));
				}
				other => debug!(hash, status = ?other, "transaction not final yet"),
			}

			if tokio::time::Instant::now() >= deadline {
				return Ok(TxStatus::Unconfirmed);
			}
			tokio::time::sleep(self.poll_interval).await;
		}
	}
}

#[async_trait::async_trait]
impl Ledger for RpcClient {
	async fn load_account(&self, address: &str) -> Result<Account> {
		let url = format!("{}/accounts/{address}", self.horizon_url);
		debug!(%url, "loading account");

		let resp = self.http.get(&url).send().await?;
		match resp.status() {
			StatusCode::NOT_FOUND => return Err(Error::AccountNotFound(address.to_owned())),
			s if !s.is_success() => {
				return Err(Error::Network(format!("account lookup returned HTTP {s}")))
			}
			_ => {}
		}

		let body: Value = resp.json().await?;
		let sequence = body
			.get("sequence")
			.and_then(Value::as_str)
			.and_then(|s| s.parse::<i64>().ok())
			.ok_or_else(|| Error::Network("account response has no sequence".into()))?;

		Ok(Account {
			address: address.to_owned(),
			sequence,
		})
	}

	async fn simulate(&self, tx: &Transaction) -> Result<Simulation> {
		let envelope = TransactionEnvelope::from(tx.clone()).to_xdr_base64(Limits::none())?;
		let result = self
			.call("simulateTransaction", json_val!({ "transaction": envelope }))
			.await?;

		if let Some(err) = result.get("error").and_then(Value::as_str) {
			return Err(Error::Simulation(err.to_owned()));
		}

		let transaction_data = result
			.get("transactionData")
			.and_then(Value::as_str)
			.map(|s| SorobanTransactionData::from_xdr_base64(s, Limits::none()))
			.transpose()?
			.ok_or_else(|| Error::Simulation("response has no transactionData".into()))?;

		let min_resource_fee = match result.get("minResourceFee") {
			Some(Value::String(s)) => s.parse().ok(),
			Some(v) => v.as_u64(),
			None => None,
		}
		.ok_or_else(|| Error::Simulation("response has no minResourceFee".into()))?;

		let first = result.pointer("/results/0");
		let auth = first
			.and_then(|r| r.get("auth"))
			.and_then(Value::as_array)
			.map(|entries| {
				entries
					.iter()
					.filter_map(Value::as_str)
					.map(|s| SorobanAuthorizationEntry::from_xdr_base64(s, Limits::none()))
					.collect::<std::result::Result<Vec<_>, _>>()
			})
			.transpose()?
			.unwrap_or_default();
		let return_value = first
			.and_then(|r| r.get("xdr"))
			.and_then(Value::as_str)
			.map(|s| ScVal::from_xdr_base64(s, Limits::none()))
			.transpose()?;

		Ok(Simulation {
			transaction_data,
			min_resource_fee,
			auth,
			result: return_value,
		})
	}

	async fn submit(&self, envelope: &TransactionEnvelope) -> Result<Submission> {
		let xdr = envelope.to_xdr_base64(Limits::none())?;
		let sent = self.send_transaction(&xdr).await?;

		let hash = sent
			.get("hash")
			.and_then(Value::as_str)
			.ok_or_else(|| Error::Network("sendTransaction response has no hash".into()))?
			.to_owned();
		let status = sent.get("status").and_then(Value::as_str).unwrap_or("");
		debug!(%hash, status, "transaction sent");

		let status = match status {
			"PENDING" | "DUPLICATE" => self.wait_for(&hash).await?,
			"ERROR" => {
				let detail = sent
					.get("errorResultXdr")
					.and_then(Value::as_str)
					.unwrap_or("no detail");
				TxStatus::Failed(format!("rejected by the network: {detail}"))
			}
			other => TxStatus::Failed(format!("unexpected submission status {other:?}")),
		};

		Ok(Submission { hash, status })
	}
}
