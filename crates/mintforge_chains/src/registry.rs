use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Supported deployment networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Arc,
    Giwa,
    Base,
    Tempo,
    MegaEth,
    Abstract,
}

impl Chain {
    /// Human-readable label for the chain.
    pub fn label(&self) -> &'static str {
        match self {
            Chain::Arc => "ARC Testnet",
            Chain::Giwa => "Giwa Sepolia Testnet",
            Chain::Base => "Base",
            Chain::Tempo => "Tempo Testnet",
            Chain::MegaEth => "MegaETH",
            Chain::Abstract => "Abstract",
        }
    }

    /// Short identifier used in config files and CLI flags.
    pub fn short_name(&self) -> &'static str {
        match self {
            Chain::Arc => "arc",
            Chain::Giwa => "giwa",
            Chain::Base => "base",
            Chain::Tempo => "tempo",
            Chain::MegaEth => "megaeth",
            Chain::Abstract => "abstract",
        }
    }

    /// Numeric EVM chain ID.
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Arc => 5_042_002,
            Chain::Giwa => 91_342,
            Chain::Base => 8_453,
            Chain::Tempo => 42_431,
            Chain::MegaEth => 4_326,
            Chain::Abstract => 2_741,
        }
    }

    /// Whether this is a test network.
    pub fn is_testnet(&self) -> bool {
        matches!(self, Chain::Arc | Chain::Giwa | Chain::Tempo)
    }

    /// All supported chains, in display order.
    pub fn all() -> &'static [Chain] {
        &[
            Chain::Arc,
            Chain::Giwa,
            Chain::Base,
            Chain::Tempo,
            Chain::MegaEth,
            Chain::Abstract,
        ]
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The currency used for gas accounting on a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Fee token details for chains whose gas token is not plain ETH.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeToken {
    pub name: String,
    pub symbol: String,
    pub contract_address: Option<String>,
    pub decimals: u8,
    pub is_native: bool,
}

/// Static parameters for a single network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSpec {
    pub chain: Chain,
    pub name: String,
    pub display_name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub rpc_fallbacks: Vec<String>,
    pub explorer_url: String,
    pub explorer_api_url: String,
    pub explorer_name: String,
    pub native_currency: NativeCurrency,
    pub fee_token: Option<FeeToken>,
    pub faucet_url: Option<String>,
}

impl ChainSpec {
    /// All RPC URLs, primary first.
    pub fn all_rpc_urls(&self) -> Vec<String> {
        let mut urls = vec![self.rpc_url.clone()];
        urls.extend(self.rpc_fallbacks.iter().cloned());
        urls
    }

    /// Explorer URL for a transaction hash.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }

    /// Explorer URL for an address.
    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }
}

fn eth() -> NativeCurrency {
    NativeCurrency {
        name: "Ethereum".into(),
        symbol: "ETH".into(),
        decimals: 18,
    }
}

static REGISTRY: Lazy<Vec<ChainSpec>> = Lazy::new(|| {
    vec![
        ChainSpec {
            chain: Chain::Arc,
            name: "ARC Testnet".into(),
            display_name: "ARC NETWORK".into(),
            chain_id: 5_042_002,
            rpc_url: "https://rpc.testnet.arc.network".into(),
            rpc_fallbacks: vec![
                "https://rpc.blockdaemon.testnet.arc.network".into(),
                "https://rpc.drpc.testnet.arc.network".into(),
                "https://rpc.quicknode.testnet.arc.network".into(),
            ],
            explorer_url: "https://testnet.arcscan.app".into(),
            explorer_api_url: "https://testnet.arcscan.app/api/v2/stats".into(),
            explorer_name: "ARC Scan".into(),
            native_currency: NativeCurrency {
                name: "USD Coin".into(),
                symbol: "USDC".into(),
                decimals: 18,
            },
            // USDC is the native gas token on ARC.
            fee_token: Some(FeeToken {
                name: "USD Coin".into(),
                symbol: "USDC".into(),
                contract_address: Some("0x3600000000000000000000000000000000000000".into()),
                decimals: 6,
                is_native: true,
            }),
            faucet_url: Some("https://faucet.testnet.arc.network".into()),
        },
        ChainSpec {
            chain: Chain::Giwa,
            name: "Giwa Sepolia Testnet".into(),
            display_name: "GIWA L2".into(),
            chain_id: 91_342,
            rpc_url: "https://sepolia-rpc.giwa.io".into(),
            rpc_fallbacks: vec![
                "https://giwa-sepolia-testnet.rpc.grove.city/v1/01fdb492".into(),
                "https://rpc.giwa.sepolia.ethpandaops.io".into(),
            ],
            explorer_url: "https://sepolia-explorer.giwa.io".into(),
            explorer_api_url: "https://sepolia-explorer.giwa.io/api/v2/stats".into(),
            explorer_name: "Giwa Explorer".into(),
            native_currency: eth(),
            fee_token: None,
            faucet_url: Some("https://faucet.lambda256.io".into()),
        },
        ChainSpec {
            chain: Chain::Base,
            name: "Base".into(),
            display_name: "BASE MAINNET".into(),
            chain_id: 8_453,
            rpc_url: "https://mainnet.base.org".into(),
            rpc_fallbacks: vec![
                "https://base.drpc.org".into(),
                "https://base.gateway.tenderly.co".into(),
                "https://1rpc.io/base".into(),
            ],
            explorer_url: "https://basescan.org".into(),
            explorer_api_url: "https://api.basescan.org/api".into(),
            explorer_name: "BaseScan".into(),
            native_currency: eth(),
            fee_token: None,
            faucet_url: None,
        },
        ChainSpec {
            chain: Chain::Tempo,
            name: "Tempo Testnet".into(),
            display_name: "TEMPO TESTNET".into(),
            chain_id: 42_431,
            rpc_url: "https://rpc.moderato.tempo.xyz".into(),
            rpc_fallbacks: vec![],
            explorer_url: "https://explore.tempo.xyz".into(),
            explorer_api_url: "https://explore.tempo.xyz/api".into(),
            explorer_name: "Tempo Explorer".into(),
            native_currency: NativeCurrency {
                name: "USD".into(),
                symbol: "USD".into(),
                decimals: 18,
            },
            // USD is the native gas token on Tempo.
            fee_token: Some(FeeToken {
                name: "USD".into(),
                symbol: "USD".into(),
                contract_address: None,
                decimals: 18,
                is_native: true,
            }),
            faucet_url: Some("https://docs.tempo.xyz/quickstart/get-testnet-usd".into()),
        },
        ChainSpec {
            chain: Chain::MegaEth,
            name: "MegaETH".into(),
            display_name: "MEGAETH MAINNET".into(),
            chain_id: 4_326,
            rpc_url: "https://mainnet.megaeth.com/rpc".into(),
            rpc_fallbacks: vec![],
            explorer_url: "https://megaeth.blockscout.com".into(),
            explorer_api_url: "https://megaeth.blockscout.com/api/v2/stats".into(),
            explorer_name: "MegaETH Blockscout".into(),
            native_currency: eth(),
            fee_token: None,
            faucet_url: None,
        },
        ChainSpec {
            chain: Chain::Abstract,
            name: "Abstract".into(),
            display_name: "ABSTRACT".into(),
            chain_id: 2_741,
            rpc_url: "https://api.mainnet.abs.xyz".into(),
            rpc_fallbacks: vec!["https://abstract.drpc.org".into()],
            explorer_url: "https://abscan.org".into(),
            explorer_api_url: "https://api.abscan.org/api".into(),
            explorer_name: "Abscan".into(),
            native_currency: eth(),
            fee_token: None,
            faucet_url: None,
        },
    ]
});

/// All registered chain specs.
pub fn registry() -> &'static [ChainSpec] {
    &REGISTRY
}

/// The spec for a given chain.
pub fn spec(chain: Chain) -> &'static ChainSpec {
    REGISTRY
        .iter()
        .find(|s| s.chain == chain)
        .expect("every Chain variant has a registry entry")
}

/// Look up a chain spec by numeric chain ID.
pub fn find_by_chain_id(chain_id: u64) -> Option<&'static ChainSpec> {
    REGISTRY.iter().find(|s| s.chain_id == chain_id)
}

/// Look up a chain spec by its short name (e.g. `"base"`, `"giwa"`).
pub fn find_by_short_name(short_name: &str) -> Option<&'static ChainSpec> {
    let needle = short_name.to_ascii_lowercase();
    REGISTRY.iter().find(|s| s.chain.short_name() == needle)
}

/// Whether a chain ID belongs to a supported network.
pub fn is_supported(chain_id: u64) -> bool {
    find_by_chain_id(chain_id).is_some()
}

/// All test networks.
pub fn testnets() -> Vec<&'static ChainSpec> {
    REGISTRY.iter().filter(|s| s.chain.is_testnet()).collect()
}

/// All main networks.
pub fn mainnets() -> Vec<&'static ChainSpec> {
    REGISTRY.iter().filter(|s| !s.chain.is_testnet()).collect()
}

/// Parameter object for the wallet `wallet_addEthereumChain` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParameters {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
    pub native_currency: NativeCurrency,
}

/// Build the `wallet_addEthereumChain` parameters for a chain: hex chain ID,
/// all RPC URLs (primary first), explorer URL, and native currency.
pub fn add_chain_parameters(chain: Chain) -> AddChainParameters {
    let spec = spec(chain);
    AddChainParameters {
        chain_id: format!("0x{:x}", spec.chain_id),
        chain_name: spec.name.clone(),
        rpc_urls: spec.all_rpc_urls(),
        block_explorer_urls: vec![spec.explorer_url.clone()],
        native_currency: spec.native_currency.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_all_chains() {
        for chain in Chain::all() {
            assert_eq!(spec(*chain).chain, *chain);
        }
        assert_eq!(registry().len(), Chain::all().len());
    }

    #[test]
    fn chain_ids_are_unique() {
        let mut ids: Vec<u64> = registry().iter().map(|s| s.chain_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), registry().len());
    }

    #[test]
    fn spec_chain_ids_match_enum() {
        for spec in registry() {
            assert_eq!(spec.chain_id, spec.chain.chain_id());
        }
    }

    #[test]
    fn default_rpc_urls_are_https() {
        for spec in registry() {
            for url in spec.all_rpc_urls() {
                assert!(url.starts_with("https://"), "RPC URL must be HTTPS: {url}");
            }
        }
    }

    #[test]
    fn find_by_chain_id_resolves_base() {
        let spec = find_by_chain_id(8453).unwrap();
        assert_eq!(spec.chain, Chain::Base);
        assert_eq!(spec.explorer_name, "BaseScan");
    }

    #[test]
    fn find_by_chain_id_unknown_returns_none() {
        assert!(find_by_chain_id(1).is_none());
        assert!(!is_supported(1));
    }

    #[test]
    fn find_by_short_name_is_case_insensitive() {
        assert_eq!(find_by_short_name("GIWA").unwrap().chain, Chain::Giwa);
        assert_eq!(find_by_short_name("megaeth").unwrap().chain, Chain::MegaEth);
        assert!(find_by_short_name("solana").is_none());
    }

    #[test]
    fn testnet_mainnet_split() {
        assert_eq!(testnets().len(), 3);
        assert_eq!(mainnets().len(), 3);
        assert!(testnets().iter().all(|s| s.faucet_url.is_some()));
    }

    #[test]
    fn fee_token_only_on_usd_native_chains() {
        assert!(spec(Chain::Arc).fee_token.as_ref().unwrap().is_native);
        assert!(spec(Chain::Tempo).fee_token.as_ref().unwrap().is_native);
        assert!(spec(Chain::Base).fee_token.is_none());
    }

    #[test]
    fn add_chain_parameters_shape() {
        let params = add_chain_parameters(Chain::Giwa);
        assert_eq!(params.chain_id, "0x164ce");
        assert_eq!(params.chain_name, "Giwa Sepolia Testnet");
        assert_eq!(params.rpc_urls.len(), 3);
        assert_eq!(params.rpc_urls[0], "https://sepolia-rpc.giwa.io");
        assert_eq!(params.native_currency.symbol, "ETH");

        // Wire format is camelCase for the wallet request.
        let json = serde_json::to_value(&params).unwrap();
        assert!(json.get("chainId").is_some());
        assert!(json.get("blockExplorerUrls").is_some());
    }

    #[test]
    fn chain_serde_round_trip() {
        let json = serde_json::to_string(&Chain::MegaEth).unwrap();
        assert_eq!(json, "\"megaeth\"");
        let parsed: Chain = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Chain::MegaEth);
    }

    #[test]
    fn explorer_url_helpers() {
        let spec = spec(Chain::Base);
        assert_eq!(spec.tx_url("0xabc"), "https://basescan.org/tx/0xabc");
        assert_eq!(spec.address_url("0xdef"), "https://basescan.org/address/0xdef");
    }
}
