use tracing::{info, warn};

use mintforge_chains::{Chain, add_chain_parameters};

use crate::client::{RpcClient, RpcError};

/// JSON-RPC error code: the wallet does not recognize the requested chain.
const UNRECOGNIZED_CHAIN: i64 = 4902;

/// How [`WalletSession::ensure_chain`] got the wallet onto the target chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainSwitch {
    /// The wallet was already on the target chain.
    AlreadyOn,
    /// The wallet switched to a chain it already knew.
    Switched,
    /// The chain was unknown to the wallet and was added first.
    Added,
}

/// A connected wallet binding: tracks the active account and chain of the
/// provider endpoint and negotiates network switches.
///
/// Signing stays inside the wallet; the session only issues requests.
#[derive(Debug)]
pub struct WalletSession {
    client: RpcClient,
    account: Option<String>,
    chain_id: Option<u64>,
}

impl WalletSession {
    pub fn new(client: RpcClient) -> Self {
        Self {
            client,
            account: None,
            chain_id: None,
        }
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    /// The connected account, once [`connect`](Self::connect) has succeeded.
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// The wallet's chain ID as of the last query.
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    /// Request account access and record the wallet's active chain.
    /// Returns the first exposed account.
    pub async fn connect(&mut self) -> Result<String, RpcError> {
        let accounts = self.client.request_accounts().await?;
        let account = accounts
            .into_iter()
            .next()
            .ok_or_else(|| RpcError::InvalidResponse("wallet exposed no accounts".into()))?;

        let chain_id = self.client.chain_id().await?;
        info!(account = %account, chain_id, "wallet connected");

        self.account = Some(account.clone());
        self.chain_id = Some(chain_id);
        Ok(account)
    }

    /// Re-query the wallet's active chain.
    pub async fn refresh_chain(&mut self) -> Result<u64, RpcError> {
        let chain_id = self.client.chain_id().await?;
        self.chain_id = Some(chain_id);
        Ok(chain_id)
    }

    /// Make sure the wallet is on `chain`, negotiating a switch if needed.
    ///
    /// On a switch failure with code 4902 the chain is added to the wallet
    /// (which also switches to it). A user rejection (code 4001) and any other
    /// provider error propagate to the caller.
    pub async fn ensure_chain(&mut self, chain: Chain) -> Result<ChainSwitch, RpcError> {
        let target = chain.chain_id();
        let current = self.refresh_chain().await?;

        if current == target {
            info!(chain = %chain, "wallet already on target chain");
            return Ok(ChainSwitch::AlreadyOn);
        }

        info!(current, target, chain = %chain, "switching wallet network");
        let outcome = match self.client.switch_chain(target).await {
            Ok(()) => ChainSwitch::Switched,
            Err(err) if err.provider_code() == Some(UNRECOGNIZED_CHAIN) => {
                warn!(chain = %chain, "chain unknown to wallet, adding it");
                let params = add_chain_parameters(chain);
                self.client.add_chain(&params).await?;
                ChainSwitch::Added
            }
            Err(err) => return Err(err),
        };

        self.chain_id = Some(target);
        info!(chain = %chain, ?outcome, "wallet network switch complete");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_no_account() {
        let client = RpcClient::new("http://localhost:8545").unwrap();
        let session = WalletSession::new(client);
        assert!(session.account().is_none());
        assert!(session.chain_id().is_none());
    }

    #[test]
    fn chain_switch_outcomes_are_distinct() {
        assert_ne!(ChainSwitch::AlreadyOn, ChainSwitch::Switched);
        assert_ne!(ChainSwitch::Switched, ChainSwitch::Added);
    }
}
