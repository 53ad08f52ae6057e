use ethers_core::types::Address;
use ethers_core::utils::to_checksum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum characters for a contract/collection name.
const NAME_MAX: usize = 64;
/// Maximum characters for a symbol (wallet display constraint).
const SYMBOL_MAX: usize = 11;

/// Rejections from user-input validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{field} is too long: {actual} characters (max {max})")]
    TooLong {
        field: &'static str,
        actual: usize,
        max: usize,
    },

    #[error("symbol must be 1-{SYMBOL_MAX} alphanumeric characters")]
    InvalidSymbol,

    #[error("supply must be a positive whole number of tokens")]
    InvalidSupply,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid creation bytecode: {0}")]
    InvalidBytecode(String),
}

/// User-supplied parameters for an ERC20 deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenParams {
    pub name: String,
    pub symbol: String,
    /// Whole-token supply as a decimal string; the contract scales by
    /// `10 ** decimals()` when minting.
    pub initial_supply: String,
}

impl TokenParams {
    /// Validate and normalize: trims the name, uppercases the symbol.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.name = validate_name(&self.name)?;
        self.symbol = validate_symbol(&self.symbol)?;
        validate_supply(&self.initial_supply)?;
        Ok(self)
    }
}

/// User-supplied parameters for an ERC721 deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftParams {
    pub name: String,
    pub symbol: String,
    /// `ipfs://…` metadata location baked into the constructor.
    pub base_uri: String,
}

impl NftParams {
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.name = validate_name(&self.name)?;
        self.symbol = validate_symbol(&self.symbol)?;
        if self.base_uri.trim().is_empty() {
            return Err(ValidationError::Empty("base URI"));
        }
        Ok(self)
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty("name"));
    }
    if trimmed.chars().count() > NAME_MAX {
        return Err(ValidationError::TooLong {
            field: "name",
            actual: trimmed.chars().count(),
            max: NAME_MAX,
        });
    }
    Ok(trimmed.to_string())
}

fn validate_symbol(symbol: &str) -> Result<String, ValidationError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty()
        || trimmed.len() > SYMBOL_MAX
        || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ValidationError::InvalidSymbol);
    }
    Ok(trimmed.to_ascii_uppercase())
}

fn validate_supply(supply: &str) -> Result<(), ValidationError> {
    let trimmed = supply.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidSupply);
    }
    if trimmed.chars().all(|c| c == '0') {
        return Err(ValidationError::InvalidSupply);
    }
    Ok(())
}

/// Validate an EVM address: `0x` prefix, 40 hex digits, and -- when the input
/// is mixed-case -- a correct EIP-55 checksum. Returns the checksummed form.
pub fn validate_address(address: &str) -> Result<String, ValidationError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty("address"));
    }
    if !trimmed.starts_with("0x") {
        return Err(ValidationError::InvalidAddress(
            "must start with 0x".into(),
        ));
    }
    if trimmed.len() != 42 {
        return Err(ValidationError::InvalidAddress(format!(
            "expected 42 characters, got {}",
            trimmed.len()
        )));
    }

    let parsed: Address = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidAddress("not valid hex".into()))?;
    let checksummed = to_checksum(&parsed, None);

    // All-lowercase and all-uppercase inputs carry no checksum information.
    let digits = &trimmed[2..];
    let has_mixed_case = digits.chars().any(|c| c.is_ascii_uppercase())
        && digits.chars().any(|c| c.is_ascii_lowercase());
    if has_mixed_case && checksummed != trimmed {
        return Err(ValidationError::InvalidAddress(
            "failed EIP-55 checksum".into(),
        ));
    }

    Ok(checksummed)
}

/// Sanity-check creation bytecode before it reaches the wallet: hex payload,
/// the standard `0x6080` Solidity prologue, and a plausible length.
pub fn validate_creation_bytecode(bytecode: &str) -> Result<(), ValidationError> {
    if bytecode.is_empty() || bytecode == "0x" {
        return Err(ValidationError::InvalidBytecode("bytecode is empty".into()));
    }
    if !bytecode.starts_with("0x6080") {
        return Err(ValidationError::InvalidBytecode(format!(
            "unexpected prologue: {}",
            &bytecode[..bytecode.len().min(10)]
        )));
    }
    if bytecode.len() < 100 {
        return Err(ValidationError::InvalidBytecode(
            "bytecode is implausibly short".into(),
        ));
    }
    if hex::decode(&bytecode[2..]).is_err() {
        return Err(ValidationError::InvalidBytecode("not valid hex".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(name: &str, symbol: &str, supply: &str) -> TokenParams {
        TokenParams {
            name: name.into(),
            symbol: symbol.into(),
            initial_supply: supply.into(),
        }
    }

    #[test]
    fn token_params_happy_path_normalizes() {
        let params = token("  My Token  ", "mtk", "1000000").validated().unwrap();
        assert_eq!(params.name, "My Token");
        assert_eq!(params.symbol, "MTK");
    }

    #[test]
    fn empty_name_is_rejected() {
        assert_eq!(
            token("   ", "MTK", "1").validated().unwrap_err(),
            ValidationError::Empty("name")
        );
    }

    #[test]
    fn overlong_name_is_rejected() {
        let name = "x".repeat(65);
        assert!(matches!(
            token(&name, "MTK", "1").validated().unwrap_err(),
            ValidationError::TooLong { field: "name", .. }
        ));
    }

    #[test]
    fn symbol_rules() {
        assert!(token("T", "", "1").validated().is_err());
        assert!(token("T", "TOOLONGSYMBOL", "1").validated().is_err());
        assert!(token("T", "MT-K", "1").validated().is_err());
        assert!(token("T", "MTK2", "1").validated().is_ok());
    }

    #[test]
    fn supply_rules() {
        assert!(token("T", "T", "0").validated().is_err());
        assert!(token("T", "T", "000").validated().is_err());
        assert!(token("T", "T", "-5").validated().is_err());
        assert!(token("T", "T", "1.5").validated().is_err());
        assert!(token("T", "T", "abc").validated().is_err());
        assert!(token("T", "T", "1000000").validated().is_ok());
    }

    #[test]
    fn nft_params_require_base_uri() {
        let params = NftParams {
            name: "Art".into(),
            symbol: "art".into(),
            base_uri: "".into(),
        };
        assert_eq!(
            params.validated().unwrap_err(),
            ValidationError::Empty("base URI")
        );

        let ok = NftParams {
            name: "Art".into(),
            symbol: "art".into(),
            base_uri: "ipfs://QmExample".into(),
        };
        assert_eq!(ok.validated().unwrap().symbol, "ART");
    }

    #[test]
    fn address_format_rules() {
        assert!(validate_address("").is_err());
        assert!(validate_address("742d35cc6634c0532925a3b844bc9e7595f2bd18").is_err());
        assert!(validate_address("0x742d35cc").is_err());
        assert!(validate_address("0xzz2d35cc6634c0532925a3b844bc9e7595f2bd18").is_err());
    }

    #[test]
    fn lowercase_address_is_checksummed() {
        let checksummed =
            validate_address("0x742d35cc6634c0532925a3b844bc9e7595f2bd18").unwrap();
        assert!(checksummed.starts_with("0x"));
        assert_eq!(checksummed.to_lowercase(), "0x742d35cc6634c0532925a3b844bc9e7595f2bd18");
    }

    #[test]
    fn checksummed_address_is_accepted_verbatim() {
        // Canonical EIP-55 test vector.
        let addr = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(validate_address(addr).unwrap(), addr);
    }

    #[test]
    fn bad_checksum_is_rejected() {
        // Same vector with one letter's case flipped.
        assert!(validate_address("0x5aaeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn bytecode_rules() {
        assert!(validate_creation_bytecode("").is_err());
        assert!(validate_creation_bytecode("0x").is_err());
        assert!(validate_creation_bytecode("0x1234").is_err());
        let short = format!("0x6080{}", "60".repeat(10));
        assert!(validate_creation_bytecode(&short).is_err());
        let plausible = format!("0x6080604052{}", "60".repeat(64));
        assert!(validate_creation_bytecode(&plausible).is_ok());
    }
}
