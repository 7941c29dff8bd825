//! Hex-address helpers shared by the read gateway and the view layer.

/// Placeholder counterparty on wagers nobody has accepted yet.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Canonical address shape: `0x` followed by exactly 40 hex chars.
pub fn is_hex_address(input: &str) -> bool {
    let Some(hex_part) = input.strip_prefix("0x") else {
        return false;
    };
    hex_part.len() == 40 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

/// On-chain addresses are case-insensitive but arrive in mixed case.
pub fn addresses_match(a: &str, b: &str) -> bool {
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn is_hex_address__accepts_canonical_shape() {
        assert!(is_hex_address("0xABCDEF0123456789ABCDEF0123456789ABCDEF01"));
        assert!(is_hex_address("0xabcdef0123456789abcdef0123456789abcdef01"));
    }

    #[test]
    fn is_hex_address__rejects_malformed_input() {
        assert!(!is_hex_address(""));
        assert!(!is_hex_address("not-an-address"));
        assert!(!is_hex_address("0x1234"));
        assert!(!is_hex_address("ABCDEF0123456789ABCDEF0123456789ABCDEF01"));
        assert!(!is_hex_address("0xZBCDEF0123456789ABCDEF0123456789ABCDEF01"));
    }

    #[test]
    fn addresses_match__ignores_case() {
        assert!(addresses_match("0xAAbbCC", "0xaabbcc"));
        assert!(!addresses_match("0xAAbbCC", "0xaabbcd"));
        assert!(!addresses_match("", ""));
    }
}
