use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use mintforge_chains::{Chain, ChainSpec};

use crate::client::{RpcClient, RpcError};
use crate::quantity;

/// How many recent blocks are sampled when estimating total transactions.
const SAMPLE_BLOCKS: u64 = 20;

/// Where a transaction count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsSource {
    ExplorerApi,
    RpcSampling,
    Unavailable,
}

/// A snapshot of per-chain figures shown by the stats view.
#[derive(Debug, Clone, Serialize)]
pub struct ChainStats {
    pub chain: Chain,
    pub block_height: u64,
    pub gas_price_gwei: f64,
    pub total_transactions: Option<u64>,
    pub source: StatsSource,
}

impl ChainStats {
    /// Transaction count with K/M suffixes, or `"N/A"` when unknown.
    pub fn formatted_transactions(&self) -> String {
        match self.total_transactions {
            Some(n) => format_count(n),
            None => "N/A".into(),
        }
    }
}

/// Format a count with K/M suffixes the way explorers display totals.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Extract a total-transaction count from an explorer stats payload.
///
/// Accepts both the Etherscan-compatible shape (`{"result": "5440000"}`) and
/// the Blockscout v2 shape (`{"total_transactions": "5440000"}`).
pub fn parse_explorer_total(body: &Value) -> Option<u64> {
    let raw = body
        .get("result")
        .or_else(|| body.get("total_transactions"))?;
    match raw {
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Extrapolate a chain-wide transaction total from sampled per-block counts.
pub fn estimate_total_transactions(block_height: u64, sampled: &[usize]) -> Option<u64> {
    if sampled.is_empty() {
        return None;
    }
    let total: usize = sampled.iter().sum();
    let avg = total as f64 / sampled.len() as f64;
    Some((avg * block_height as f64) as u64)
}

async fn explorer_total(spec: &ChainSpec) -> Option<u64> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .ok()?;

    let url = format!("{}?module=stats&action=totaltx", spec.explorer_api_url);
    debug!(chain = %spec.chain, url = %url, "querying explorer stats API");

    let response = http
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .await
        .ok()?;
    if !response.status().is_success() {
        return None;
    }
    let body: Value = response.json().await.ok()?;
    parse_explorer_total(&body)
}

async fn sampled_total(client: &RpcClient, block_height: u64) -> Result<Option<u64>, RpcError> {
    let sample_size = SAMPLE_BLOCKS.min(block_height + 1);
    let mut counts = Vec::with_capacity(sample_size as usize);
    for offset in 0..sample_size {
        let number = block_height - offset;
        if let Some(count) = client.block_transaction_count(number).await? {
            counts.push(count);
        }
    }
    Ok(estimate_total_transactions(block_height, &counts))
}

/// Fetch a stats snapshot for a chain.
///
/// Block height and gas price come straight from the RPC. The transaction
/// total prefers the explorer stats API; when the explorer does not answer,
/// it falls back to sampling the last [`SAMPLE_BLOCKS`] blocks and
/// extrapolating. Neither path failing leaves the count at `None` rather than
/// failing the snapshot.
pub async fn fetch_stats(client: &RpcClient, spec: &ChainSpec) -> Result<ChainStats, RpcError> {
    let block_height = client.block_number().await?;
    let gas_price_gwei = quantity::wei_to_gwei(client.gas_price().await?);

    if let Some(total) = explorer_total(spec).await {
        return Ok(ChainStats {
            chain: spec.chain,
            block_height,
            gas_price_gwei,
            total_transactions: Some(total),
            source: StatsSource::ExplorerApi,
        });
    }

    match sampled_total(client, block_height).await {
        Ok(Some(total)) => Ok(ChainStats {
            chain: spec.chain,
            block_height,
            gas_price_gwei,
            total_transactions: Some(total),
            source: StatsSource::RpcSampling,
        }),
        Ok(None) => Ok(ChainStats {
            chain: spec.chain,
            block_height,
            gas_price_gwei,
            total_transactions: None,
            source: StatsSource::Unavailable,
        }),
        Err(e) => {
            warn!(chain = %spec.chain, error = %e, "block sampling failed");
            Ok(ChainStats {
                chain: spec.chain,
                block_height,
                gas_price_gwei,
                total_transactions: None,
                source: StatsSource::Unavailable,
            })
        }
    }
}

/// Periodically fetches [`ChainStats`] until shut down.
pub struct StatsPoller {
    interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl StatsPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle that stops the poller when set to `true`.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Poll on the fixed interval, invoking `on_stats` for each snapshot.
    /// Fetch failures are logged and the loop keeps going.
    pub async fn run<F>(&self, client: &RpcClient, spec: &ChainSpec, mut on_stats: F)
    where
        F: FnMut(ChainStats),
    {
        while !self.shutdown.load(Ordering::Relaxed) {
            match fetch_stats(client, spec).await {
                Ok(stats) => on_stats(stats),
                Err(e) => warn!(chain = %spec.chain, error = %e, "stats fetch failed"),
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_count_suffixes() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(5_400), "5.4K");
        assert_eq!(format_count(5_440_000), "5.44M");
    }

    #[test]
    fn parse_explorer_etherscan_shape() {
        let body = json!({"status": "1", "message": "OK", "result": "5440000"});
        assert_eq!(parse_explorer_total(&body), Some(5_440_000));
    }

    #[test]
    fn parse_explorer_blockscout_shape() {
        let body = json!({"total_transactions": "123456"});
        assert_eq!(parse_explorer_total(&body), Some(123_456));
    }

    #[test]
    fn parse_explorer_numeric_and_comma_values() {
        assert_eq!(parse_explorer_total(&json!({"result": 42})), Some(42));
        assert_eq!(
            parse_explorer_total(&json!({"result": "5,440,000"})),
            Some(5_440_000)
        );
    }

    #[test]
    fn parse_explorer_rejects_junk() {
        assert_eq!(parse_explorer_total(&json!({})), None);
        assert_eq!(parse_explorer_total(&json!({"result": "not-a-number"})), None);
        assert_eq!(parse_explorer_total(&json!({"result": null})), None);
    }

    #[test]
    fn estimate_extrapolates_average() {
        // 10 tx/block average over a 1000-block chain -> ~10000 total.
        assert_eq!(
            estimate_total_transactions(1_000, &[8, 10, 12]),
            Some(10_000)
        );
    }

    #[test]
    fn estimate_with_no_samples_is_none() {
        assert_eq!(estimate_total_transactions(1_000, &[]), None);
    }

    #[test]
    fn formatted_transactions_handles_unknown() {
        let stats = ChainStats {
            chain: Chain::Base,
            block_height: 1,
            gas_price_gwei: 0.1,
            total_transactions: None,
            source: StatsSource::Unavailable,
        };
        assert_eq!(stats.formatted_transactions(), "N/A");
    }

    #[tokio::test]
    async fn poller_stops_on_shutdown() {
        let poller = StatsPoller::new(Duration::from_millis(10));
        let shutdown = poller.shutdown_handle();
        shutdown.store(true, Ordering::Relaxed);

        let client = RpcClient::new("http://127.0.0.1:9/").unwrap();
        let spec = mintforge_chains::spec(Chain::Base);
        // Shutdown already requested: run returns without polling.
        poller.run(&client, spec, |_| {}).await;
    }
}
