//! Constructor-argument encoding for deployment data.
//!
//! Deployment data is the creation bytecode with the ABI-encoded constructor
//! arguments appended; the wallet receives it as the `data` of a transaction
//! with no `to` address.

use ethers_core::abi::Token;
use ethers_core::types::{Address, U256};
use ethers_core::utils::{get_contract_address, to_checksum};

use crate::validate::ValidationError;

/// ABI-encode a constructor argument list.
pub fn encode_constructor_args(args: &[Token]) -> Vec<u8> {
    ethers_core::abi::encode(args)
}

/// Creation bytecode plus encoded constructor arguments, as `0x…` hex.
pub fn deploy_data(bytecode: &str, args: &[Token]) -> Result<String, ValidationError> {
    let stripped = bytecode
        .strip_prefix("0x")
        .ok_or_else(|| ValidationError::InvalidBytecode("missing 0x prefix".into()))?;
    let mut data = hex::decode(stripped)
        .map_err(|_| ValidationError::InvalidBytecode("not valid hex".into()))?;
    data.extend_from_slice(&encode_constructor_args(args));
    Ok(format!("0x{}", hex::encode(data)))
}

/// Parse a whole-token supply string into the constructor argument.
///
/// The generated token contract scales by `10 ** decimals()` on-chain, so the
/// argument stays in whole tokens. The count still has to survive that
/// scaling inside a uint256.
pub fn parse_supply(supply: &str) -> Result<U256, ValidationError> {
    let tokens = U256::from_dec_str(supply.trim()).map_err(|_| ValidationError::InvalidSupply)?;
    if tokens.is_zero() {
        return Err(ValidationError::InvalidSupply);
    }
    if tokens.checked_mul(U256::exp10(18)).is_none() {
        return Err(ValidationError::InvalidSupply);
    }
    Ok(tokens)
}

/// The CREATE address for a deployment from `sender` with `nonce`, in
/// checksummed form. Used when a receipt arrives without `contractAddress`.
pub fn compute_contract_address(sender: &str, nonce: u64) -> Result<String, ValidationError> {
    let sender: Address = sender
        .parse()
        .map_err(|_| ValidationError::InvalidAddress("not valid hex".into()))?;
    let address = get_contract_address(sender, U256::from(nonce));
    Ok(to_checksum(&address, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_supply_stays_in_whole_tokens() {
        assert_eq!(parse_supply("1000000").unwrap(), U256::from(1_000_000u64));
        assert_eq!(parse_supply(" 42 ").unwrap(), U256::from(42u64));
    }

    #[test]
    fn parse_supply_rejects_zero_and_garbage() {
        assert!(parse_supply("0").is_err());
        assert!(parse_supply("").is_err());
        assert!(parse_supply("1.5").is_err());
        assert!(parse_supply("lots").is_err());
    }

    #[test]
    fn parse_supply_rejects_overflow() {
        // U256::MAX in decimal cannot survive the 10^18 scaling.
        let max = U256::MAX.to_string();
        assert!(parse_supply(&max).is_err());
    }

    #[test]
    fn uint_arg_encodes_to_one_word() {
        let encoded = encode_constructor_args(&[Token::Uint(U256::from(1))]);
        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[31], 1);
    }

    #[test]
    fn string_arg_encodes_offset_len_data() {
        // offset word + length word + one padded data word.
        let encoded = encode_constructor_args(&[Token::String("ipfs://Qm".into())]);
        assert_eq!(encoded.len(), 96);
    }

    #[test]
    fn deploy_data_appends_args_to_bytecode() {
        let data = deploy_data("0x6080", &[Token::Uint(U256::from(7))]).unwrap();
        assert_eq!(data.len(), 2 + 4 + 64);
        assert!(data.starts_with("0x6080"));
        assert!(data.ends_with("07"));
    }

    #[test]
    fn deploy_data_with_no_args_is_bytecode() {
        assert_eq!(deploy_data("0x6080abcd", &[]).unwrap(), "0x6080abcd");
    }

    #[test]
    fn deploy_data_rejects_bad_bytecode() {
        assert!(deploy_data("6080", &[]).is_err());
        assert!(deploy_data("0xzz", &[]).is_err());
    }

    #[test]
    fn create_address_matches_known_vector() {
        let address =
            compute_contract_address("0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0", 0).unwrap();
        assert_eq!(
            address.to_lowercase(),
            "0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d"
        );
    }

    #[test]
    fn create_address_depends_on_nonce() {
        let sender = "0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0";
        let first = compute_contract_address(sender, 0).unwrap();
        let second = compute_contract_address(sender, 1).unwrap();
        assert_ne!(first, second);
    }
}
