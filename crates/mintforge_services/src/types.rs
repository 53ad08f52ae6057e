//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_supply() -> u64 {
    1_000_000
}

#[derive(Debug, Deserialize)]
pub struct CompileTokenRequest {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_supply")]
    pub initial_supply: u64,
}

#[derive(Debug, Deserialize)]
pub struct CompileNftRequest {
    pub name: String,
    pub symbol: String,
    /// Optional at compile time; the URI is a constructor argument, not part
    /// of the bytecode.
    #[serde(default)]
    pub base_uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompileResponse {
    pub success: bool,
    pub bytecode: String,
    pub abi: Value,
    pub contract_name: String,
    pub source_code: String,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    /// Image bytes, hex-encoded (with or without `0x` prefix).
    pub content_hex: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub image_cid: String,
    pub image_url: String,
    /// Constructor argument for the collection contract.
    pub base_uri: String,
    pub metadata_cid: String,
    pub collection_cid: Option<String>,
    pub image_gateway: String,
    pub metadata_gateway: String,
    pub collection_gateway: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptRequest {
    pub tx_hash: String,
    /// Chain short name; resolved through the registry.
    #[serde(default)]
    pub chain: Option<String>,
    /// Explicit RPC URL, overriding `chain`.
    #[serde(default)]
    pub rpc_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub success: bool,
    /// `null` while the transaction is pending.
    pub receipt: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub chain: String,
    pub block_height: u64,
    pub gas_price_gwei: f64,
    pub transactions: String,
    pub method: mintforge_rpc::StatsSource,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_request_defaults_supply() {
        let request: CompileTokenRequest =
            serde_json::from_str(r#"{"name":"T","symbol":"TT"}"#).unwrap();
        assert_eq!(request.initial_supply, 1_000_000);
    }

    #[test]
    fn token_request_reads_explicit_supply() {
        let request: CompileTokenRequest =
            serde_json::from_str(r#"{"name":"T","symbol":"TT","initial_supply":42}"#).unwrap();
        assert_eq!(request.initial_supply, 42);
    }

    #[test]
    fn error_response_shape() {
        let json = serde_json::to_value(ErrorResponse::new("boom")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
    }
}
