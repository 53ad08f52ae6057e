//! Route handlers, kept free of hyper plumbing so they can be exercised
//! directly in tests.

use hyper::{Method, StatusCode};
use serde_json::{Value, json};
use tracing::{error, info};

use mintforge_contracts::validate::{NftParams, TokenParams};
use mintforge_contracts::{CompileError, Compiler};
use mintforge_rpc::{RpcClient, fetch_stats};

use crate::pinning::{PinError, PinningClient};
use crate::types::{
    CompileNftRequest, CompileTokenRequest, CompileResponse, ErrorResponse, ReceiptRequest,
    ReceiptResponse, StatsResponse, UploadRequest,
};
use crate::upload::upload_collection;

/// Shared state behind the HTTP API.
pub struct AppState {
    pub compiler: Compiler,
    pub pinning: PinningClient,
}

fn ok(value: impl serde::Serialize) -> (StatusCode, Value) {
    (StatusCode::OK, json!(value))
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Value) {
    (StatusCode::BAD_REQUEST, json!(ErrorResponse::new(message)))
}

fn internal(message: impl Into<String>) -> (StatusCode, Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!(ErrorResponse::new(message)),
    )
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, (StatusCode, Value)> {
    serde_json::from_slice(body).map_err(|e| bad_request(format!("invalid request body: {e}")))
}

/// Dispatch a request to its handler.
pub async fn handle_request(
    state: &AppState,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: &[u8],
) -> (StatusCode, Value) {
    match (method, path) {
        (&Method::POST, "/compile/token") => compile_token(state, body).await,
        (&Method::POST, "/compile/nft") => compile_nft(state, body).await,
        (&Method::POST, "/ipfs/upload") => ipfs_upload(state, body).await,
        (&Method::POST, "/receipt") => receipt(body).await,
        (&Method::GET, "/stats") => stats(query).await,
        (&Method::GET, "/healthz") => ok(json!({ "status": "ok" })),
        (_, "/compile/token" | "/compile/nft" | "/ipfs/upload" | "/receipt") => (
            StatusCode::METHOD_NOT_ALLOWED,
            json!(ErrorResponse::new("POST required")),
        ),
        (_, "/stats" | "/healthz") => (
            StatusCode::METHOD_NOT_ALLOWED,
            json!(ErrorResponse::new("GET required")),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            json!(ErrorResponse::new("unknown route")),
        ),
    }
}

fn compile_response(contract: mintforge_contracts::CompiledContract) -> (StatusCode, Value) {
    ok(CompileResponse {
        success: true,
        bytecode: contract.bytecode,
        abi: contract.abi,
        contract_name: contract.contract_name,
        source_code: contract.source_code,
        warnings: contract.warnings,
    })
}

/// Solidity diagnostics come back as `{success: false}` bodies with a 200
/// (the compile itself ran), bad input is a 400, and a broken compiler
/// setup is a 500.
fn compile_error_response(err: CompileError) -> (StatusCode, Value) {
    match err {
        CompileError::Validation(e) => bad_request(e.to_string()),
        CompileError::Solidity(message) => (StatusCode::OK, json!(ErrorResponse::new(message))),
        CompileError::MissingContract(_) | CompileError::EmptyBytecode(_) => {
            (StatusCode::OK, json!(ErrorResponse::new(err.to_string())))
        }
        other => {
            error!(error = %other, "compiler invocation failed");
            internal(format!("Compilation failed: {other}"))
        }
    }
}

async fn compile_token(state: &AppState, body: &[u8]) -> (StatusCode, Value) {
    let request: CompileTokenRequest = match parse_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.initial_supply == 0 {
        return bad_request("Initial supply must be positive");
    }

    info!(name = %request.name, symbol = %request.symbol, "compile token request");
    let params = TokenParams {
        name: request.name,
        symbol: request.symbol,
        initial_supply: request.initial_supply.to_string(),
    };
    match state.compiler.compile_token(params).await {
        Ok(contract) => compile_response(contract),
        Err(e) => compile_error_response(e),
    }
}

async fn compile_nft(state: &AppState, body: &[u8]) -> (StatusCode, Value) {
    let request: CompileNftRequest = match parse_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    info!(name = %request.name, symbol = %request.symbol, base_uri = ?request.base_uri, "compile nft request");
    let params = NftParams {
        name: request.name,
        symbol: request.symbol,
        // The URI is a constructor argument; compilation only needs a
        // placeholder that passes validation.
        base_uri: request.base_uri.unwrap_or_else(|| "ipfs://pending".into()),
    };
    match state.compiler.compile_nft(params).await {
        Ok(contract) => compile_response(contract),
        Err(e) => compile_error_response(e),
    }
}

async fn ipfs_upload(state: &AppState, body: &[u8]) -> (StatusCode, Value) {
    let request: UploadRequest = match parse_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.name.is_empty()
        || request.symbol.is_empty()
        || request.file_name.is_empty()
        || request.content_hex.is_empty()
    {
        return bad_request("Missing required fields: file, name, or symbol");
    }

    match upload_collection(&state.pinning, request).await {
        Ok(response) => ok(response),
        Err(PinError::InvalidResponse(message)) => bad_request(message),
        Err(e) => {
            error!(error = %e, "ipfs upload failed");
            internal(format!("IPFS upload failed: {e}"))
        }
    }
}

async fn receipt(body: &[u8]) -> (StatusCode, Value) {
    let request: ReceiptRequest = match parse_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.tx_hash.is_empty() {
        return bad_request("tx_hash is required");
    }

    let rpc_url = match (&request.rpc_url, &request.chain) {
        (Some(url), _) => url.clone(),
        (None, Some(chain)) => match mintforge_chains::find_by_short_name(chain) {
            Some(spec) => spec.rpc_url.clone(),
            None => return bad_request(format!("unknown chain: {chain}")),
        },
        (None, None) => return bad_request("chain or rpc_url is required"),
    };

    let client = match RpcClient::new(rpc_url) {
        Ok(client) => client,
        Err(e) => return internal(e.to_string()),
    };
    match client.get_transaction_receipt(&request.tx_hash).await {
        Ok(receipt) => ok(ReceiptResponse {
            success: true,
            receipt: receipt.map(|r| json!(r)),
        }),
        Err(e) => internal(e.to_string()),
    }
}

fn query_param<'a>(query: Option<&'a str>, key: &str) -> Option<&'a str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

async fn stats(query: Option<&str>) -> (StatusCode, Value) {
    let chain = match query_param(query, "chain") {
        Some(chain) => chain,
        None => return bad_request("chain query parameter is required"),
    };
    let spec = match mintforge_chains::find_by_short_name(chain) {
        Some(spec) => spec,
        None => return bad_request(format!("unknown chain: {chain}")),
    };

    let client = match RpcClient::new(spec.rpc_url.clone()) {
        Ok(client) => client,
        Err(e) => return internal(e.to_string()),
    };
    match fetch_stats(&client, spec).await {
        Ok(stats) => ok(StatsResponse {
            success: true,
            chain: spec.chain.short_name().to_string(),
            block_height: stats.block_height,
            gas_price_gwei: stats.gas_price_gwei,
            transactions: stats.formatted_transactions(),
            method: stats.source,
        }),
        Err(e) => internal(e.to_string()),
    }
}
