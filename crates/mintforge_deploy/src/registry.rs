use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use mintforge_chains::Chain;
use mintforge_contracts::templates::ContractKind;

/// A record of one successful deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployedContract {
    pub id: String,
    pub address: String,
    pub contract_type: ContractKind,
    pub name: String,
    pub symbol: String,
    pub chain: Chain,
    pub chain_id: u64,
    pub tx_hash: String,
    pub deployed_at: DateTime<Utc>,
}

/// Per-network history of deployed contracts, keyed by chain ID.
///
/// Records are appended after each successful deployment and persisted to a
/// JSON file. Last write wins; entries are never revalidated against chain
/// state.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ContractRegistry {
    contracts: HashMap<u64, Vec<DeployedContract>>,
}

impl ContractRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            contracts: HashMap::new(),
        }
    }

    /// Append a deployment record. Returns the generated record ID.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &mut self,
        address: String,
        contract_type: ContractKind,
        name: String,
        symbol: String,
        chain: Chain,
        tx_hash: String,
    ) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let entry = DeployedContract {
            id: id.clone(),
            address: address.clone(),
            contract_type,
            name,
            symbol,
            chain,
            chain_id: chain.chain_id(),
            tx_hash,
            deployed_at: Utc::now(),
        };
        info!(record_id = %id, address = %address, chain = %chain, "deployment recorded");
        self.contracts.entry(chain.chain_id()).or_default().push(entry);
        id
    }

    /// Deployments on one chain, oldest first.
    pub fn contracts_for(&self, chain_id: u64) -> &[DeployedContract] {
        self.contracts
            .get(&chain_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All records across chains.
    pub fn all(&self) -> Vec<&DeployedContract> {
        let mut records: Vec<&DeployedContract> = self.contracts.values().flatten().collect();
        records.sort_by_key(|r| r.deployed_at);
        records
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.contracts.values().map(Vec::len).sum()
    }

    /// Whether the registry has no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist the registry to a JSON file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize registry")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        std::fs::write(path, json).context("failed to write registry file")?;

        // Owner-only on Unix (0o600 = rw-------).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .context("failed to set registry file permissions")?;
        }

        info!(path = %path.display(), count = self.len(), "contract registry saved");
        Ok(())
    }

    /// Load a registry from a JSON file. Returns an empty registry if the file
    /// does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "registry file not found, starting empty");
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path).context("failed to read registry file")?;
        let registry: Self =
            serde_json::from_str(&json).context("failed to deserialize registry")?;
        info!(path = %path.display(), count = registry.len(), "contract registry loaded");
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_base_token(registry: &mut ContractRegistry, address: &str) -> String {
        registry.record(
            address.into(),
            ContractKind::Token,
            "My Token".into(),
            "MTK".into(),
            Chain::Base,
            "0xhash".into(),
        )
    }

    #[test]
    fn record_and_lookup_by_chain() {
        let mut registry = ContractRegistry::new();
        record_base_token(&mut registry, "0x1");

        let base = registry.contracts_for(Chain::Base.chain_id());
        assert_eq!(base.len(), 1);
        assert_eq!(base[0].address, "0x1");
        assert_eq!(base[0].chain_id, 8453);

        // Other chains are untouched.
        assert!(registry.contracts_for(Chain::Giwa.chain_id()).is_empty());
    }

    #[test]
    fn records_append_in_order() {
        let mut registry = ContractRegistry::new();
        record_base_token(&mut registry, "0x1");
        record_base_token(&mut registry, "0x2");

        let base = registry.contracts_for(8453);
        assert_eq!(base[0].address, "0x1");
        assert_eq!(base[1].address, "0x2");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contracts.json");

        let mut registry = ContractRegistry::new();
        registry.record(
            "0xdeployed".into(),
            ContractKind::Nft,
            "Art".into(),
            "ART".into(),
            Chain::Giwa,
            "0xtx".into(),
        );
        registry.save_to_file(&path).unwrap();

        let loaded = ContractRegistry::load_from_file(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        let record = &loaded.contracts_for(91_342)[0];
        assert_eq!(record.address, "0xdeployed");
        assert!(matches!(record.contract_type, ContractKind::Nft));
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry =
            ContractRegistry::load_from_file(&dir.path().join("nope.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn all_flattens_across_chains() {
        let mut registry = ContractRegistry::new();
        record_base_token(&mut registry, "0x1");
        registry.record(
            "0x2".into(),
            ContractKind::Token,
            "T".into(),
            "T".into(),
            Chain::Giwa,
            "0xtx".into(),
        );
        assert_eq!(registry.all().len(), 2);
    }
}
