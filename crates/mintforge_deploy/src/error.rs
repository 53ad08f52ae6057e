use thiserror::Error;

use mintforge_chains::ChainSpec;
use mintforge_contracts::{CompileError, ValidationError};
use mintforge_rpc::RpcError;
use mintforge_rpc::quantity::wei_to_eth;

/// JSON-RPC error code: the user dismissed the wallet prompt.
const USER_REJECTED: i64 = 4001;

/// Deployment workflow failures, mapped to the categories shown to users.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("no wallet connected; call connect() first")]
    NotConnected,

    #[error("wallet is locked or exposed no accounts")]
    WalletLocked,

    #[error("insufficient balance: have {have:.6} {symbol}, need at least {need:.6} {symbol}")]
    InsufficientFunds {
        have: f64,
        need: f64,
        symbol: String,
        /// Testnet faucet to point the user at, when one exists.
        faucet: Option<String>,
    },

    #[error("rejected by user: {0}")]
    UserRejected(String),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("nonce conflict: {0}")]
    Nonce(String),

    #[error("transaction still pending after {waited_secs}s (tx {tx_hash})")]
    Timeout { tx_hash: String, waited_secs: u64 },

    #[error("network error: {0}")]
    Network(String),

    #[error(transparent)]
    Rpc(RpcError),
}

impl DeployError {
    /// A remediation hint for display next to the error, when one applies.
    pub fn hint(&self) -> Option<String> {
        match self {
            DeployError::InsufficientFunds { faucet: Some(url), .. } => {
                Some(format!("Get test tokens from the faucet: {url}"))
            }
            DeployError::InsufficientFunds { faucet: None, .. } => {
                Some("Fund the wallet and try again.".into())
            }
            DeployError::UserRejected(_) => {
                Some("Approve the request in the wallet to continue.".into())
            }
            DeployError::Reverted(_) => {
                Some("Check the constructor parameters and compiled bytecode.".into())
            }
            DeployError::Nonce(_) => {
                Some("Reconnect the wallet so it can resync its pending nonce.".into())
            }
            DeployError::WalletLocked => Some("Unlock the wallet and reconnect.".into()),
            DeployError::Timeout { tx_hash, .. } => Some(format!(
                "The transaction may still confirm; check the explorer for {tx_hash}."
            )),
            _ => None,
        }
    }
}

/// Map a provider failure onto the deployment error taxonomy.
///
/// Wallet/provider errors arrive as free-form messages, so the mapping is
/// substring-based: rejection codes first, then the known phrases
/// (`insufficient`, `revert`, `nonce`, `no accounts`), then transport
/// failures as network errors.
pub fn classify_provider_error(spec: &ChainSpec, err: RpcError) -> DeployError {
    match &err {
        RpcError::Provider { code, message, .. } => {
            if *code == USER_REJECTED {
                return DeployError::UserRejected(message.clone());
            }

            let lower = message.to_lowercase();
            if lower.contains("user rejected")
                || lower.contains("user denied")
                || lower.contains("denied")
            {
                DeployError::UserRejected(message.clone())
            } else if lower.contains("insufficient") {
                // The provider refused before we could quote numbers; keep the
                // category and attach the faucet.
                DeployError::InsufficientFunds {
                    have: 0.0,
                    need: 0.0,
                    symbol: spec.native_currency.symbol.clone(),
                    faucet: spec.faucet_url.clone(),
                }
            } else if lower.contains("execution reverted") || lower.contains("revert") {
                DeployError::Reverted(message.clone())
            } else if lower.contains("nonce") {
                DeployError::Nonce(message.clone())
            } else if lower.contains("no accounts") || lower.contains("unauthorized") {
                DeployError::WalletLocked
            } else if lower.contains("network") || lower.contains("connection") {
                DeployError::Network(message.clone())
            } else {
                DeployError::Rpc(err)
            }
        }
        RpcError::Transport(e) => DeployError::Network(e.to_string()),
        RpcError::Http { status } => DeployError::Network(format!("HTTP {status} from endpoint")),
        RpcError::InvalidResponse(_) => DeployError::Rpc(err),
    }
}

/// Build the insufficient-funds error from an actual balance comparison.
pub fn insufficient_funds(spec: &ChainSpec, have_wei: u128, need_wei: u128) -> DeployError {
    DeployError::InsufficientFunds {
        have: wei_to_eth(have_wei),
        need: wei_to_eth(need_wei),
        symbol: spec.native_currency.symbol.clone(),
        faucet: spec.faucet_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mintforge_chains::{Chain, spec};

    fn provider_err(code: i64, message: &str) -> RpcError {
        RpcError::Provider {
            code,
            message: message.into(),
            data: None,
        }
    }

    #[test]
    fn code_4001_is_user_rejection() {
        let err = classify_provider_error(spec(Chain::Giwa), provider_err(4001, "User rejected the request."));
        assert!(matches!(err, DeployError::UserRejected(_)));
    }

    #[test]
    fn rejection_phrases_are_user_rejection() {
        for message in ["User rejected tx", "user denied transaction signature"] {
            let err = classify_provider_error(spec(Chain::Base), provider_err(-32000, message));
            assert!(matches!(err, DeployError::UserRejected(_)), "{message}");
        }
    }

    #[test]
    fn insufficient_phrase_carries_faucet_on_testnets() {
        let err = classify_provider_error(
            spec(Chain::Giwa),
            provider_err(-32000, "insufficient funds for gas * price + value"),
        );
        match err {
            DeployError::InsufficientFunds { faucet, symbol, .. } => {
                assert_eq!(faucet.as_deref(), Some("https://faucet.lambda256.io"));
                assert_eq!(symbol, "ETH");
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
    }

    #[test]
    fn revert_phrases_classify_as_reverted() {
        let err = classify_provider_error(
            spec(Chain::Base),
            provider_err(-32000, "execution reverted: Base URI cannot be empty"),
        );
        assert!(matches!(err, DeployError::Reverted(_)));
    }

    #[test]
    fn nonce_and_locked_wallet_phrases() {
        let nonce = classify_provider_error(
            spec(Chain::Base),
            provider_err(-32000, "nonce too low"),
        );
        assert!(matches!(nonce, DeployError::Nonce(_)));

        let locked = classify_provider_error(
            spec(Chain::Base),
            provider_err(-32000, "no accounts available"),
        );
        assert!(matches!(locked, DeployError::WalletLocked));
    }

    #[test]
    fn unknown_provider_errors_pass_through() {
        let err = classify_provider_error(spec(Chain::Base), provider_err(-32601, "method not found"));
        assert!(matches!(err, DeployError::Rpc(_)));
    }

    #[test]
    fn http_failures_are_network_errors() {
        let err = classify_provider_error(spec(Chain::Base), RpcError::Http { status: 502 });
        assert!(matches!(err, DeployError::Network(_)));
    }

    #[test]
    fn insufficient_funds_formats_amounts() {
        let err = insufficient_funds(spec(Chain::Giwa), 500_000_000_000_000, 4_500_000_000_000_000);
        let message = err.to_string();
        assert!(message.contains("0.000500 ETH"));
        assert!(message.contains("0.004500 ETH"));
        assert!(err.hint().unwrap().contains("faucet"));
    }

    #[test]
    fn timeout_hint_names_the_transaction() {
        let err = DeployError::Timeout {
            tx_hash: "0xabc".into(),
            waited_secs: 300,
        };
        assert!(err.hint().unwrap().contains("0xabc"));
    }
}
