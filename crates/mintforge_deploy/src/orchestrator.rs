use std::time::Duration;

use ethers_core::abi::Token;
use ethers_core::types::Address;
use serde::Serialize;
use tracing::{info, warn};

use mintforge_chains::{Chain, ChainSpec, spec};
use mintforge_contracts::templates::ContractKind;
use mintforge_contracts::validate::{NftParams, TokenParams};
use mintforge_contracts::{
    CompiledContract, abi, validate_creation_bytecode,
};
use mintforge_rpc::{RpcError, TransactionRequest, WalletSession, quantity};

use crate::error::{DeployError, classify_provider_error, insufficient_funds};

/// Fallback gas limit when estimation fails.
const DEFAULT_GAS_LIMIT: u64 = 3_000_000;
/// Gas limit assumed by the pre-flight minimum-balance heuristic.
const HEURISTIC_GAS: u128 = 3_000_000;
/// Gas limit for the optional post-deploy mint transaction.
const MINT_GAS_LIMIT: u64 = 100_000;

/// What to deploy: a token or an NFT collection, with validated parameters.
#[derive(Debug, Clone)]
pub enum DeployRequest {
    Token(TokenParams),
    Nft(NftParams),
}

impl DeployRequest {
    pub fn kind(&self) -> ContractKind {
        match self {
            DeployRequest::Token(_) => ContractKind::Token,
            DeployRequest::Nft(_) => ContractKind::Nft,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DeployRequest::Token(p) => &p.name,
            DeployRequest::Nft(p) => &p.name,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            DeployRequest::Token(p) => &p.symbol,
            DeployRequest::Nft(p) => &p.symbol,
        }
    }

    /// Run parameter validation, normalizing the contained params.
    pub fn validated(self) -> Result<Self, DeployError> {
        Ok(match self {
            DeployRequest::Token(p) => DeployRequest::Token(p.validated()?),
            DeployRequest::Nft(p) => DeployRequest::Nft(p.validated()?),
        })
    }

    /// The ABI tokens for the template's constructor.
    pub fn constructor_args(&self) -> Result<Vec<Token>, DeployError> {
        Ok(match self {
            DeployRequest::Token(p) => vec![Token::Uint(abi::parse_supply(&p.initial_supply)?)],
            DeployRequest::Nft(p) => vec![Token::String(p.base_uri.clone())],
        })
    }
}

/// Knobs for the deployment workflow.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Percentage added on top of the gas estimate.
    pub gas_buffer_percent: u64,
    /// Gas limit used when estimation fails.
    pub default_gas_limit: u64,
    /// Receipt polling interval.
    pub poll_interval: Duration,
    /// Receipt polling attempts before giving up.
    pub max_poll_attempts: u32,
    /// Run an `eth_call` dry run before submitting (failures never abort).
    pub simulate: bool,
    /// After an NFT deployment, mint token #1 to the deployer.
    pub auto_mint_first_nft: bool,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            gas_buffer_percent: 50,
            default_gas_limit: DEFAULT_GAS_LIMIT,
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: 60,
            simulate: true,
            auto_mint_first_nft: false,
        }
    }
}

/// A confirmed deployment.
#[derive(Debug, Clone, Serialize)]
pub struct Deployment {
    pub contract_address: String,
    pub tx_hash: String,
    pub chain: Chain,
    pub gas_used: Option<u64>,
    pub block_number: Option<u64>,
    pub explorer_tx_url: String,
    pub explorer_address_url: String,
    /// Transaction hash of the post-deploy mint, when one was requested.
    pub mint_tx_hash: Option<String>,
}

/// Pre-flight minimum balance for a chain: heuristic gas x typical gas price
/// x 1.5 safety factor. Base runs far cheaper than the other networks.
pub fn min_balance_wei(chain: Chain) -> u128 {
    let estimated_cost = match chain {
        Chain::Base => HEURISTIC_GAS * 100_000_000,       // 3M gas x 0.1 gwei
        _ => HEURISTIC_GAS * 1_000_000_000,               // 3M gas x 1 gwei
    };
    estimated_cost * 150 / 100
}

/// Apply the safety buffer to a gas estimate.
pub fn buffered_gas(estimate: u64, buffer_percent: u64) -> u64 {
    estimate.saturating_mul(100 + buffer_percent) / 100
}

/// Drives the deployment workflow against a connected wallet session:
/// balance check, network negotiation, gas estimation with fallback,
/// submission, and receipt polling.
pub struct Deployer {
    session: WalletSession,
    spec: &'static ChainSpec,
    options: DeployOptions,
}

impl Deployer {
    pub fn new(session: WalletSession, chain: Chain, options: DeployOptions) -> Self {
        Self {
            session,
            spec: spec(chain),
            options,
        }
    }

    pub fn session_mut(&mut self) -> &mut WalletSession {
        &mut self.session
    }

    /// Deploy a compiled template. `request` must describe the same template
    /// the artifact was compiled from; its constructor arguments are encoded
    /// and appended to the artifact bytecode.
    pub async fn deploy(
        &mut self,
        artifact: &CompiledContract,
        request: DeployRequest,
    ) -> Result<Deployment, DeployError> {
        let request = request.validated()?;
        let account = self
            .session
            .account()
            .ok_or(DeployError::NotConnected)?
            .to_string();

        info!(
            contract = %artifact.contract_name,
            kind = ?request.kind(),
            chain = %self.spec.chain,
            account = %account,
            "starting deployment"
        );

        // 1. Balance gate. A failed query is only a warning; a confirmed
        //    shortfall aborts before the wallet ever prompts.
        let balance = self.check_balance(&account).await?;

        // 2. Network negotiation.
        self.session
            .ensure_chain(self.spec.chain)
            .await
            .map_err(|e| classify_provider_error(self.spec, e))?;

        // 3. Nonce, for the CREATE-address fallback. The wallet manages the
        //    real nonce if the query fails.
        let nonce = match self.session.client().get_transaction_count(&account).await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(error = %e, "nonce query failed, letting the wallet manage it");
                None
            }
        };

        // 4. Deployment data.
        validate_creation_bytecode(&artifact.bytecode)?;
        let args = request.constructor_args()?;
        let data = abi::deploy_data(&artifact.bytecode, &args)?;

        let mut tx = TransactionRequest {
            from: Some(account.clone()),
            data: Some(data),
            nonce: nonce.map(quantity::to_hex),
            ..Default::default()
        };

        // 5. Gas estimation with buffered fallback.
        let gas_limit = self.estimate_gas(&tx).await?;
        tx.gas = Some(quantity::to_hex(gas_limit));

        // 6. Affordability check against the live gas price, when available.
        if let (Some(balance), Ok(gas_price)) = (balance, self.session.client().gas_price().await)
        {
            let max_cost = gas_limit as u128 * gas_price;
            info!(
                gas_limit,
                gas_price_gwei = quantity::wei_to_gwei(gas_price),
                max_cost_eth = quantity::wei_to_eth(max_cost),
                "estimated deployment cost"
            );
            if max_cost > balance {
                return Err(insufficient_funds(self.spec, balance, max_cost));
            }
        }

        // 7. Dry run. Never fatal: some providers reject eth_call with
        //    creation data outright.
        if self.options.simulate {
            match self.session.client().call(&tx).await {
                Ok(_) => info!("simulation passed"),
                Err(e) => warn!(error = %e, "simulation failed, submitting anyway"),
            }
        }

        // 8. Submission.
        let tx_hash = self
            .session
            .client()
            .send_transaction(&tx)
            .await
            .map_err(|e| classify_provider_error(self.spec, e))?;
        info!(tx_hash = %tx_hash, explorer = %self.spec.tx_url(&tx_hash), "transaction submitted");

        // 9. Receipt polling.
        let receipt = self.await_receipt(&tx_hash).await?;

        let contract_address = match receipt.contract_address.clone() {
            Some(address) => address,
            None => {
                // Receipt without a contract address: recompute the CREATE
                // address from sender + nonce when we know the nonce.
                let nonce = nonce.ok_or_else(|| {
                    DeployError::Rpc(RpcError::InvalidResponse(
                        "receipt carries no contract address and the nonce is unknown".into(),
                    ))
                })?;
                let computed = abi::compute_contract_address(&account, nonce)?;
                warn!(address = %computed, "receipt lacked contract address, computed from nonce");
                computed
            }
        };

        // Deployed-code sanity check. Absence is only a warning: some RPCs
        // lag a block or two behind their own receipts.
        match self.session.client().get_code(&contract_address).await {
            Ok(code) if code == "0x" || code.is_empty() => {
                warn!(address = %contract_address, "no code visible at contract address yet");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "deployed-code check failed"),
        }

        let mut deployment = Deployment {
            contract_address: contract_address.clone(),
            tx_hash: tx_hash.clone(),
            chain: self.spec.chain,
            gas_used: receipt.gas_used_u64(),
            block_number: receipt.block_number_u64(),
            explorer_tx_url: self.spec.tx_url(&tx_hash),
            explorer_address_url: self.spec.address_url(&contract_address),
            mint_tx_hash: None,
        };

        info!(
            address = %deployment.contract_address,
            gas_used = ?deployment.gas_used,
            block = ?deployment.block_number,
            "deployment confirmed"
        );

        // 10. Optional first mint for collections.
        if self.options.auto_mint_first_nft && request.kind() == ContractKind::Nft {
            deployment.mint_tx_hash = self.mint_first(&account, &contract_address).await;
        }

        Ok(deployment)
    }

    /// Query the balance and enforce the pre-flight minimum. Returns the
    /// balance when the query succeeded.
    async fn check_balance(&self, account: &str) -> Result<Option<u128>, DeployError> {
        match self.session.client().get_balance(account).await {
            Ok(balance) => {
                let minimum = min_balance_wei(self.spec.chain);
                info!(
                    balance_eth = quantity::wei_to_eth(balance),
                    minimum_eth = quantity::wei_to_eth(minimum),
                    symbol = %self.spec.native_currency.symbol,
                    "balance check"
                );
                if balance < minimum {
                    return Err(insufficient_funds(self.spec, balance, minimum));
                }
                Ok(Some(balance))
            }
            Err(e) => {
                warn!(error = %e, "balance query failed, continuing without the check");
                Ok(None)
            }
        }
    }

    /// Estimate gas for the deployment, with the configured buffer. A revert
    /// during estimation means the constructor itself is broken and aborts;
    /// any other failure falls back to the default limit.
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, DeployError> {
        match self.session.client().estimate_gas(tx).await {
            Ok(estimate) => {
                let limit = buffered_gas(estimate, self.options.gas_buffer_percent);
                info!(estimate, limit, "gas estimated");
                Ok(limit)
            }
            Err(e) => {
                if let RpcError::Provider { message, .. } = &e {
                    let lower = message.to_lowercase();
                    if lower.contains("revert") {
                        return Err(DeployError::Reverted(message.clone()));
                    }
                }
                warn!(
                    error = %e,
                    fallback = self.options.default_gas_limit,
                    "gas estimation failed, using default limit"
                );
                Ok(self.options.default_gas_limit)
            }
        }
    }

    /// Poll for the receipt until confirmation, revert, or the attempt budget
    /// runs out. Poll-time RPC errors are logged and retried.
    async fn await_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<mintforge_rpc::TransactionReceipt, DeployError> {
        for attempt in 0..self.options.max_poll_attempts {
            match self.session.client().get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    if receipt.is_reverted() {
                        return Err(DeployError::Reverted(format!(
                            "transaction {tx_hash} reverted on-chain"
                        )));
                    }
                    return Ok(receipt);
                }
                Ok(None) => {
                    if attempt % 10 == 0 {
                        info!(
                            attempt,
                            max = self.options.max_poll_attempts,
                            "transaction pending"
                        );
                    }
                }
                Err(e) => warn!(error = %e, "receipt poll failed, retrying"),
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }

        Err(DeployError::Timeout {
            tx_hash: tx_hash.to_string(),
            waited_secs: self.options.max_poll_attempts as u64
                * self.options.poll_interval.as_secs(),
        })
    }

    /// Mint token #1 of a fresh collection to the deployer. Failures are
    /// logged and reported as `None`; the deployment itself already
    /// succeeded.
    async fn mint_first(&self, account: &str, contract_address: &str) -> Option<String> {
        let to: Address = match account.parse() {
            Ok(address) => address,
            Err(_) => {
                warn!(account, "cannot parse deployer address for first mint");
                return None;
            }
        };

        let selector = &ethers_core::utils::keccak256("mint(address)".as_bytes())[..4];
        let mut call = selector.to_vec();
        call.extend_from_slice(&ethers_core::abi::encode(&[Token::Address(to)]));

        let tx = TransactionRequest {
            from: Some(account.to_string()),
            to: Some(contract_address.to_string()),
            data: Some(format!("0x{}", hex::encode(call))),
            gas: Some(quantity::to_hex(MINT_GAS_LIMIT)),
            ..Default::default()
        };

        match self.session.client().send_transaction(&tx).await {
            Ok(tx_hash) => {
                info!(tx_hash = %tx_hash, "first NFT minted to deployer");
                Some(tx_hash)
            }
            Err(e) => {
                warn!(error = %e, "first mint failed; call mint() manually");
                None
            }
        }
    }
}
