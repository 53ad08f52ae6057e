pub mod client;
pub mod health;
pub mod quantity;
pub mod stats;
pub mod wallet;

pub use client::{RpcClient, RpcError, TransactionReceipt, TransactionRequest};
pub use health::{RpcHealth, check_endpoint, find_best_rpc, probe_chain};
pub use stats::{ChainStats, StatsPoller, StatsSource, fetch_stats, format_count};
pub use wallet::{ChainSwitch, WalletSession};
