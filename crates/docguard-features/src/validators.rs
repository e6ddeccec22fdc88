//! Field format validators and issuer membership checks.

/// Institutions the pipeline accepts bank statements and checks from.
///
/// Matching is by normalized substring so that "JPMorgan Chase Bank, N.A."
/// and "Chase" both resolve to the same issuer.
const SUPPORTED_BANKS: &[&str] = &[
    "chase",
    "jpmorgan",
    "bank of america",
    "wells fargo",
    "citibank",
    "citigroup",
    "u.s. bank",
    "us bank",
    "pnc",
    "capital one",
    "td bank",
    "truist",
    "fifth third",
    "regions",
    "keybank",
    "huntington",
    "ally",
    "navy federal",
];

/// Issuers the pipeline accepts money orders from.
const SUPPORTED_MONEY_ORDER_ISSUERS: &[&str] = &[
    "western union",
    "moneygram",
    "usps",
    "united states postal service",
    "postal service",
    "walmart",
];

/// Whether a bank name belongs to a supported institution.
pub fn is_supported_bank(name: &str) -> bool {
    let normalized = normalize(name);
    SUPPORTED_BANKS.iter().any(|b| normalized.contains(b))
}

/// Whether a money-order issuer is supported.
pub fn is_supported_money_order_issuer(name: &str) -> bool {
    let normalized = normalize(name);
    SUPPORTED_MONEY_ORDER_ISSUERS
        .iter()
        .any(|b| normalized.contains(b))
}

/// Routing number format: exactly nine ASCII digits.
pub fn is_valid_routing_format(routing: &str) -> bool {
    let trimmed = routing.trim();
    trimmed.len() == 9 && trimmed.bytes().all(|b| b.is_ascii_digit())
}

/// ABA routing checksum: 3(d1+d4+d7) + 7(d2+d5+d8) + (d3+d6+d9) = 0 mod 10.
pub fn routing_checksum_ok(routing: &str) -> bool {
    let trimmed = routing.trim();
    if !is_valid_routing_format(trimmed) {
        return false;
    }
    let digits: Vec<u32> = trimmed.bytes().map(|b| (b - b'0') as u32).collect();
    let sum = 3 * (digits[0] + digits[3] + digits[6])
        + 7 * (digits[1] + digits[4] + digits[7])
        + (digits[2] + digits[5] + digits[8]);
    sum % 10 == 0
}

/// Account number format: 8 to 17 ASCII digits.
pub fn is_valid_account_number(account: &str) -> bool {
    let trimmed = account.trim();
    (8..=17).contains(&trimmed.len()) && trimmed.bytes().all(|b| b.is_ascii_digit())
}

/// Check number format: 1 to 10 digits, not all zeros.
pub fn is_valid_check_number(number: &str) -> bool {
    let trimmed = number.trim();
    (1..=10).contains(&trimmed.len())
        && trimmed.bytes().all(|b| b.is_ascii_digit())
        && trimmed.bytes().any(|b| b != b'0')
}

/// Money-order serial format: 9 to 12 digits.
pub fn is_valid_serial_number(serial: &str) -> bool {
    let trimmed = serial.trim();
    (9..=12).contains(&trimmed.len()) && trimmed.bytes().all(|b| b.is_ascii_digit())
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_bank_matching() {
        assert!(is_supported_bank("Chase"));
        assert!(is_supported_bank("JPMorgan Chase Bank, N.A."));
        assert!(is_supported_bank("  WELLS   FARGO "));
        assert!(!is_supported_bank("First Bank of Nowhere"));
    }

    #[test]
    fn test_routing_format() {
        assert!(is_valid_routing_format("021000021"));
        assert!(!is_valid_routing_format("02100002"));
        assert!(!is_valid_routing_format("02100002a"));
        assert!(!is_valid_routing_format("0210000211"));
    }

    #[test]
    fn test_routing_checksum() {
        // Chase NY and Bank of America NC, both real ABA numbers.
        assert!(routing_checksum_ok("021000021"));
        assert!(routing_checksum_ok("053000196"));
        assert!(!routing_checksum_ok("021000022"));
        assert!(!routing_checksum_ok("123456789"));
    }

    #[test]
    fn test_account_number_format() {
        assert!(is_valid_account_number("4532887123456789"));
        assert!(is_valid_account_number("12345678"));
        assert!(!is_valid_account_number("1234567"));
        assert!(!is_valid_account_number("123456789012345678"));
        assert!(!is_valid_account_number("45328871x3456789"));
    }

    #[test]
    fn test_check_number_format() {
        assert!(is_valid_check_number("1042"));
        assert!(!is_valid_check_number("0000"));
        assert!(!is_valid_check_number(""));
        assert!(!is_valid_check_number("12345678901"));
    }

    #[test]
    fn test_serial_number_format() {
        assert!(is_valid_serial_number("1234567890"));
        assert!(!is_valid_serial_number("12345678"));
        assert!(!is_valid_serial_number("1234567890123"));
    }

    #[test]
    fn test_money_order_issuers() {
        assert!(is_supported_money_order_issuer("Western Union"));
        assert!(is_supported_money_order_issuer("USPS Money Order"));
        assert!(!is_supported_money_order_issuer("Bodega Express"));
    }
}
