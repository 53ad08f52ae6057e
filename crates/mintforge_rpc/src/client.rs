use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use mintforge_chains::AddChainParameters;

use crate::quantity;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors surfaced by the provider client.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from RPC endpoint")]
    Http { status: u16 },

    /// A JSON-RPC error object returned by the provider or wallet.
    #[error("provider error {code}: {message}")]
    Provider {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// The JSON-RPC error code, if this is a provider error.
    pub fn provider_code(&self) -> Option<i64> {
        match self {
            RpcError::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// An EVM transaction request in wallet wire format: camelCase keys, hex
/// quantities, absent fields omitted so the wallet fills its own defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// `None` for contract creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<String>,
}

/// Pass-through shape of `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
    #[serde(default)]
    pub effective_gas_price: Option<String>,
    #[serde(default)]
    pub logs: Vec<Value>,
}

impl TransactionReceipt {
    /// Whether the transaction executed successfully (`status == 0x1`).
    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .and_then(|s| quantity::parse_u64(s).ok())
            .map(|s| s == 1)
            .unwrap_or(false)
    }

    /// Whether the transaction reverted (`status == 0x0`).
    pub fn is_reverted(&self) -> bool {
        self.status
            .as_deref()
            .and_then(|s| quantity::parse_u64(s).ok())
            .map(|s| s == 0)
            .unwrap_or(false)
    }

    pub fn gas_used_u64(&self) -> Option<u64> {
        self.gas_used
            .as_deref()
            .and_then(|s| quantity::parse_u64(s).ok())
    }

    pub fn block_number_u64(&self) -> Option<u64> {
        self.block_number
            .as_deref()
            .and_then(|s| quantity::parse_u64(s).ok())
    }

    pub fn effective_gas_price_u128(&self) -> Option<u128> {
        self.effective_gas_price
            .as_deref()
            .and_then(|s| quantity::parse_u128(s).ok())
    }
}

/// JSON-RPC 2.0 client for a wallet-enabled provider endpoint.
///
/// The endpoint is trusted with signing: `eth_sendTransaction` and the
/// `wallet_*` methods are forwarded as-is, and no key material ever passes
/// through this client.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// The endpoint URL this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue a raw JSON-RPC request and return the `result` value.
    ///
    /// A `null` result is returned as `Value::Null` -- for some methods
    /// (receipt lookup in particular) that is a meaningful answer, not an
    /// error.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!(method, endpoint = %self.url, "rpc request");

        let response = self.http.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Http {
                status: status.as_u16(),
            });
        }

        let envelope: Value = response.json().await?;
        if let Some(error) = envelope.get("error") {
            return Err(RpcError::Provider {
                code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown provider error")
                    .to_string(),
                data: error.get("data").cloned(),
            });
        }

        match envelope.get("result") {
            Some(result) => Ok(result.clone()),
            None => Err(RpcError::InvalidResponse(
                "response has neither result nor error".into(),
            )),
        }
    }

    fn expect_string(value: Value, method: &str) -> Result<String, RpcError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::InvalidResponse(format!("{method} returned a non-string result")))
    }

    // -----------------------------------------------------------------------
    // eth_* methods
    // -----------------------------------------------------------------------

    /// `eth_requestAccounts` -- asks the wallet to expose its accounts.
    pub async fn request_accounts(&self) -> Result<Vec<String>, RpcError> {
        let result = self.request("eth_requestAccounts", json!([])).await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::InvalidResponse(format!("eth_requestAccounts: {e}")))
    }

    /// `eth_accounts` -- already-authorized accounts, no wallet prompt.
    pub async fn accounts(&self) -> Result<Vec<String>, RpcError> {
        let result = self.request("eth_accounts", json!([])).await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::InvalidResponse(format!("eth_accounts: {e}")))
    }

    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        let result = self.request("eth_chainId", json!([])).await?;
        quantity::parse_u64(&Self::expect_string(result, "eth_chainId")?)
    }

    pub async fn block_number(&self) -> Result<u64, RpcError> {
        let result = self.request("eth_blockNumber", json!([])).await?;
        quantity::parse_u64(&Self::expect_string(result, "eth_blockNumber")?)
    }

    /// Balance of `address` at the latest block, in wei.
    pub async fn get_balance(&self, address: &str) -> Result<u128, RpcError> {
        let result = self
            .request("eth_getBalance", json!([address, "latest"]))
            .await?;
        quantity::parse_u128(&Self::expect_string(result, "eth_getBalance")?)
    }

    /// Transaction count (nonce) of `address` at the latest block.
    pub async fn get_transaction_count(&self, address: &str) -> Result<u64, RpcError> {
        let result = self
            .request("eth_getTransactionCount", json!([address, "latest"]))
            .await?;
        quantity::parse_u64(&Self::expect_string(result, "eth_getTransactionCount")?)
    }

    pub async fn gas_price(&self) -> Result<u128, RpcError> {
        let result = self.request("eth_gasPrice", json!([])).await?;
        quantity::parse_u128(&Self::expect_string(result, "eth_gasPrice")?)
    }

    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, RpcError> {
        let result = self.request("eth_estimateGas", json!([tx])).await?;
        quantity::parse_u64(&Self::expect_string(result, "eth_estimateGas")?)
    }

    /// `eth_call` against the latest block; returns the raw hex return data.
    pub async fn call(&self, tx: &TransactionRequest) -> Result<String, RpcError> {
        let result = self.request("eth_call", json!([tx, "latest"])).await?;
        Self::expect_string(result, "eth_call")
    }

    /// Submit a transaction for signing and broadcast; returns the tx hash.
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, RpcError> {
        let result = self.request("eth_sendTransaction", json!([tx])).await?;
        Self::expect_string(result, "eth_sendTransaction")
    }

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        let result = self
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| RpcError::InvalidResponse(format!("eth_getTransactionReceipt: {e}")))
    }

    /// Deployed bytecode at `address` (`"0x"` when no contract exists).
    pub async fn get_code(&self, address: &str) -> Result<String, RpcError> {
        let result = self
            .request("eth_getCode", json!([address, "latest"]))
            .await?;
        Self::expect_string(result, "eth_getCode")
    }

    /// Transaction count of a block by number; `None` if the block is unknown.
    pub async fn block_transaction_count(&self, number: u64) -> Result<Option<usize>, RpcError> {
        let result = self
            .request(
                "eth_getBlockByNumber",
                json!([quantity::to_hex(number), false]),
            )
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let count = result
            .get("transactions")
            .and_then(Value::as_array)
            .map(Vec::len)
            .ok_or_else(|| {
                RpcError::InvalidResponse("eth_getBlockByNumber result lacks transactions".into())
            })?;
        Ok(Some(count))
    }

    // -----------------------------------------------------------------------
    // wallet_* methods
    // -----------------------------------------------------------------------

    /// `wallet_switchEthereumChain`. Code 4902 means the wallet does not know
    /// the chain; code 4001 means the user rejected the prompt.
    pub async fn switch_chain(&self, chain_id: u64) -> Result<(), RpcError> {
        self.request(
            "wallet_switchEthereumChain",
            json!([{ "chainId": quantity::to_hex(chain_id) }]),
        )
        .await?;
        Ok(())
    }

    /// `wallet_addEthereumChain` with full chain parameters.
    pub async fn add_chain(&self, params: &AddChainParameters) -> Result<(), RpcError> {
        self.request("wallet_addEthereumChain", json!([params])).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_request_omits_absent_fields() {
        let tx = TransactionRequest {
            from: Some("0xabc".into()),
            data: Some("0x6080".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["from"], "0xabc");
        assert_eq!(json["data"], "0x6080");
        // Contract creation: no `to`, and unset options never hit the wire.
        assert!(json.get("to").is_none());
        assert!(json.get("gasPrice").is_none());
        assert!(json.get("nonce").is_none());
    }

    #[test]
    fn transaction_request_uses_camel_case() {
        let tx = TransactionRequest {
            gas_price: Some("0x1".into()),
            max_fee_per_gas: Some("0x2".into()),
            tx_type: Some("0x2".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert!(json.get("gasPrice").is_some());
        assert!(json.get("maxFeePerGas").is_some());
        assert_eq!(json["type"], "0x2");
    }

    #[test]
    fn receipt_success_and_revert() {
        let success: TransactionReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": "0xaaa",
            "status": "0x1",
            "contractAddress": "0xbbb",
            "gasUsed": "0x12d687",
            "blockNumber": "0x10"
        }))
        .unwrap();
        assert!(success.is_success());
        assert!(!success.is_reverted());
        assert_eq!(success.gas_used_u64().unwrap(), 1_234_567);
        assert_eq!(success.block_number_u64().unwrap(), 16);

        let reverted: TransactionReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": "0xaaa",
            "status": "0x0"
        }))
        .unwrap();
        assert!(reverted.is_reverted());
        assert!(!reverted.is_success());
    }

    #[test]
    fn receipt_without_status_is_neither() {
        let receipt: TransactionReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": "0xaaa"
        }))
        .unwrap();
        assert!(!receipt.is_success());
        assert!(!receipt.is_reverted());
        assert!(receipt.contract_address.is_none());
    }

    #[test]
    fn provider_code_accessor() {
        let err = RpcError::Provider {
            code: 4902,
            message: "Unrecognized chain ID".into(),
            data: None,
        };
        assert_eq!(err.provider_code(), Some(4902));
        assert_eq!(
            RpcError::InvalidResponse("x".into()).provider_code(),
            None
        );
    }
}
