use std::time::Instant;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use mintforge_chains::ChainSpec;

use crate::client::RpcClient;

/// Result of probing a single RPC endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RpcHealth {
    pub url: String,
    pub healthy: bool,
    pub block_number: Option<u64>,
    pub chain_id: Option<u64>,
    pub latency_ms: u64,
    pub error: Option<String>,
}

/// Probe an endpoint with `eth_blockNumber` + `eth_chainId` and measure
/// latency. An endpoint answering for the wrong chain is reported unhealthy.
pub async fn check_endpoint(url: &str, expected_chain_id: u64) -> RpcHealth {
    let start = Instant::now();

    let client = match RpcClient::new(url) {
        Ok(client) => client,
        Err(e) => {
            return RpcHealth {
                url: url.to_string(),
                healthy: false,
                block_number: None,
                chain_id: None,
                latency_ms: start.elapsed().as_millis() as u64,
                error: Some(e.to_string()),
            };
        }
    };

    let block_number = match client.block_number().await {
        Ok(n) => n,
        Err(e) => {
            return RpcHealth {
                url: url.to_string(),
                healthy: false,
                block_number: None,
                chain_id: None,
                latency_ms: start.elapsed().as_millis() as u64,
                error: Some(e.to_string()),
            };
        }
    };

    let chain_id = match client.chain_id().await {
        Ok(id) => id,
        Err(e) => {
            return RpcHealth {
                url: url.to_string(),
                healthy: false,
                block_number: Some(block_number),
                chain_id: None,
                latency_ms: start.elapsed().as_millis() as u64,
                error: Some(e.to_string()),
            };
        }
    };

    let latency_ms = start.elapsed().as_millis() as u64;

    if chain_id != expected_chain_id {
        return RpcHealth {
            url: url.to_string(),
            healthy: false,
            block_number: Some(block_number),
            chain_id: Some(chain_id),
            latency_ms,
            error: Some(format!(
                "wrong chain ID: {chain_id} (expected {expected_chain_id})"
            )),
        };
    }

    RpcHealth {
        url: url.to_string(),
        healthy: true,
        block_number: Some(block_number),
        chain_id: Some(chain_id),
        latency_ms,
        error: None,
    }
}

/// Probe a chain's primary and fallback endpoints concurrently.
pub async fn probe_chain(spec: &ChainSpec) -> Vec<RpcHealth> {
    let urls = spec.all_rpc_urls();
    let probes = urls
        .iter()
        .map(|url| check_endpoint(url, spec.chain_id));
    join_all(probes).await
}

/// Probe all of a chain's endpoints and return the fastest healthy one.
pub async fn find_best_rpc(spec: &ChainSpec) -> Option<RpcHealth> {
    let mut results: Vec<RpcHealth> = probe_chain(spec)
        .await
        .into_iter()
        .filter(|r| r.healthy)
        .collect();

    if results.is_empty() {
        warn!(chain = %spec.chain, "no healthy RPC endpoints found");
        return None;
    }

    results.sort_by_key(|r| r.latency_ms);
    let best = results.remove(0);
    info!(
        chain = %spec.chain,
        url = %best.url,
        latency_ms = best.latency_ms,
        block = ?best.block_number,
        "selected best RPC endpoint"
    );
    Some(best)
}
