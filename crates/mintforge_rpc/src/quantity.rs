//! Hex-quantity helpers for the EVM JSON-RPC wire format.

use crate::client::RpcError;

/// Parse a `0x`-prefixed hex quantity into a `u64`.
pub fn parse_u64(value: &str) -> Result<u64, RpcError> {
    let digits = strip_prefix(value)?;
    u64::from_str_radix(digits, 16)
        .map_err(|_| RpcError::InvalidResponse(format!("invalid hex quantity: {value}")))
}

/// Parse a `0x`-prefixed hex quantity into a `u128`. Balances and wei costs
/// can exceed `u64` on 18-decimal chains.
pub fn parse_u128(value: &str) -> Result<u128, RpcError> {
    let digits = strip_prefix(value)?;
    u128::from_str_radix(digits, 16)
        .map_err(|_| RpcError::InvalidResponse(format!("invalid hex quantity: {value}")))
}

/// Format a `u64` as a `0x`-prefixed hex quantity.
pub fn to_hex(value: u64) -> String {
    format!("0x{value:x}")
}

/// Format a `u128` as a `0x`-prefixed hex quantity.
pub fn to_hex_u128(value: u128) -> String {
    format!("0x{value:x}")
}

/// Convert wei to whole native-currency units (18 decimals).
pub fn wei_to_eth(wei: u128) -> f64 {
    wei as f64 / 1e18
}

/// Convert wei to gwei.
pub fn wei_to_gwei(wei: u128) -> f64 {
    wei as f64 / 1e9
}

fn strip_prefix(value: &str) -> Result<&str, RpcError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| RpcError::InvalidResponse(format!("quantity missing 0x prefix: {value}")))?;
    if digits.is_empty() {
        return Err(RpcError::InvalidResponse(format!(
            "empty hex quantity: {value}"
        )));
    }
    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_quantities() {
        assert_eq!(parse_u64("0x0").unwrap(), 0);
        assert_eq!(parse_u64("0x1").unwrap(), 1);
        assert_eq!(parse_u64("0x164ce").unwrap(), 91_342);
        assert_eq!(parse_u64("0X2DC6C0").unwrap(), 3_000_000);
    }

    #[test]
    fn parses_leading_zero_digits() {
        // Some providers pad quantities; accept them anyway.
        assert_eq!(parse_u64("0x0001").unwrap(), 1);
    }

    #[test]
    fn parses_u128_beyond_u64() {
        // 10^21 wei (1000 ETH) does not fit in u64.
        let wei = parse_u128("0x3635c9adc5dea00000").unwrap();
        assert_eq!(wei, 1_000_000_000_000_000_000_000u128);
    }

    #[test]
    fn rejects_missing_prefix_and_garbage() {
        assert!(parse_u64("164ce").is_err());
        assert!(parse_u64("0x").is_err());
        assert!(parse_u64("0xzz").is_err());
    }

    #[test]
    fn round_trips_to_hex() {
        assert_eq!(to_hex(3_000_000), "0x2dc6c0");
        assert_eq!(parse_u64(&to_hex(91_342)).unwrap(), 91_342);
        assert_eq!(parse_u128(&to_hex_u128(u128::MAX)).unwrap(), u128::MAX);
    }

    #[test]
    fn wei_conversions() {
        assert_eq!(wei_to_eth(1_000_000_000_000_000_000), 1.0);
        assert_eq!(wei_to_gwei(2_000_000_000), 2.0);
    }
}
