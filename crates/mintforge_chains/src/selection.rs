use std::collections::HashMap;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::registry::{Chain, spec};

/// Per-chain RPC endpoint overrides layered over the registry defaults.
///
/// Only the overrides are stored; a chain without one resolves to the
/// registry's primary URL. Overrides are validated on entry and can be
/// cleared at any time to fall back to the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcSelection {
    #[serde(default)]
    overrides: HashMap<Chain, String>,
}

impl RpcSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active RPC URL for a chain: the override when one is set,
    /// otherwise the registry primary.
    pub fn url(&self, chain: Chain) -> &str {
        self.overrides
            .get(&chain)
            .map(String::as_str)
            .unwrap_or(&spec(chain).rpc_url)
    }

    /// Whether the chain currently points at a custom endpoint.
    pub fn is_custom(&self, chain: Chain) -> bool {
        self.overrides.contains_key(&chain)
    }

    /// Override the RPC URL for a chain with a custom endpoint.
    ///
    /// Returns `Err` if the URL fails validation; the previous selection is
    /// left untouched in that case.
    pub fn set_custom(&mut self, chain: Chain, url: String) -> Result<()> {
        validate_url(&url)?;
        self.overrides.insert(chain, url);
        Ok(())
    }

    /// Drop a chain's override, falling back to the registry default.
    pub fn reset_to_default(&mut self, chain: Chain) {
        self.overrides.remove(&chain);
    }
}

/// Check that an endpoint URL is well-formed, uses HTTP or HTTPS, and names
/// a host.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| anyhow::anyhow!("invalid RPC URL {url:?}: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => bail!("invalid RPC URL {url:?}: unsupported scheme {other:?}"),
    }
    if parsed.host().is_none() {
        bail!("invalid RPC URL {url:?}: missing host");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_selection_resolves_registry_urls() {
        let selection = RpcSelection::new();
        for chain in Chain::all() {
            assert_eq!(selection.url(*chain), spec(*chain).rpc_url);
            assert!(!selection.is_custom(*chain));
        }
    }

    #[test]
    fn override_takes_precedence() {
        let mut selection = RpcSelection::new();
        selection
            .set_custom(Chain::Base, "https://my-node.example.com".into())
            .unwrap();

        assert!(selection.is_custom(Chain::Base));
        assert_eq!(selection.url(Chain::Base), "https://my-node.example.com");
        // Other chains still resolve to their defaults.
        assert!(!selection.is_custom(Chain::Giwa));
    }

    #[test]
    fn rejected_override_leaves_selection_untouched() {
        let mut selection = RpcSelection::new();
        assert!(selection.set_custom(Chain::Base, "not-a-url".into()).is_err());
        assert!(
            selection
                .set_custom(Chain::Base, "ftp://files.example.com".into())
                .is_err()
        );
        assert!(!selection.is_custom(Chain::Base));
        assert_eq!(selection.url(Chain::Base), spec(Chain::Base).rpc_url);
    }

    #[test]
    fn reset_drops_the_override() {
        let mut selection = RpcSelection::new();
        selection
            .set_custom(Chain::Giwa, "https://custom.example.com".into())
            .unwrap();
        selection.reset_to_default(Chain::Giwa);

        assert!(!selection.is_custom(Chain::Giwa));
        assert_eq!(selection.url(Chain::Giwa), spec(Chain::Giwa).rpc_url);
    }

    #[test]
    fn validate_url_accepts_http_and_https() {
        assert!(validate_url("https://rpc.example.com").is_ok());
        assert!(validate_url("http://localhost:8545").is_ok());
    }

    #[test]
    fn validate_url_rejects_garbage() {
        assert!(validate_url("").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("ftp://server.com").is_err());
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn selection_serde_round_trip() {
        let mut selection = RpcSelection::new();
        selection
            .set_custom(Chain::MegaEth, "https://my-node.example.com".into())
            .unwrap();

        let json = serde_json::to_string(&selection).unwrap();
        let parsed: RpcSelection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.url(Chain::MegaEth), "https://my-node.example.com");
        assert!(!parsed.is_custom(Chain::Base));
    }
}
