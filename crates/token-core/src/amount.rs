//! Base-unit amount encoding
//!
//! Token amounts travel as non-negative integers of base units, scaled by
//! `10^decimals` relative to the human-readable amount. All conversions here
//! use 256-bit integer arithmetic so large supplies never lose precision.

use alloy_primitives::U256;
use thiserror::Error;
use tracing::warn;

/// Decimals assumed when a contract does not report its own
pub const DEFAULT_DECIMALS: u8 = 18;

/// Largest `decimals` for which `10^decimals` fits in a U256
pub const MAX_DECIMALS: u8 = 77;

/// Fraction digits kept by the display formatter
const DISPLAY_FRACTION_DIGITS: u8 = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount must not be negative: {0}")]
    Negative(String),

    #[error("Invalid amount: {0}")]
    Invalid(String),

    #[error("Amount does not fit in 256 bits: {0}")]
    Overflow(String),

    #[error("Decimals out of range: {0} (max {MAX_DECIMALS})")]
    DecimalsOutOfRange(u8),
}

/// `10^decimals`, or an error when it would not fit in 256 bits
pub fn pow10(decimals: u8) -> Result<U256, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::DecimalsOutOfRange(decimals));
    }
    Ok(U256::from(10u64).pow(U256::from(decimals)))
}

/// A human-entered decimal split into its digit runs
struct DecimalParts<'a> {
    integer: &'a str,
    fraction: &'a str,
}

fn split_decimal(input: &str) -> Result<DecimalParts<'_>, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative(trimmed.to_string()));
    }
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !all_digits(integer) || !all_digits(fraction)
    {
        return Err(AmountError::Invalid(trimmed.to_string()));
    }

    Ok(DecimalParts { integer, fraction })
}

fn digits_to_u256(digits: &str, original: &str) -> Result<U256, AmountError> {
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow(original.to_string()))
}

/// Whether a human-entered amount is strictly greater than zero
pub fn is_positive(human: &str) -> Result<bool, AmountError> {
    let parts = split_decimal(human)?;
    Ok(parts
        .integer
        .bytes()
        .chain(parts.fraction.bytes())
        .any(|b| b != b'0'))
}

/// Convert a human decimal amount into base units.
///
/// Fraction digits beyond `decimals` are truncated, never rounded, so the
/// encoded amount is never larger than what the user typed.
pub fn parse_token_amount(human: &str, decimals: u8) -> Result<U256, AmountError> {
    let scale = pow10(decimals)?;
    let parts = split_decimal(human)?;
    let original = human.trim();

    let integer = digits_to_u256(parts.integer, original)?;

    let kept = &parts.fraction[..parts.fraction.len().min(decimals as usize)];
    let padding = pow10(decimals - kept.len() as u8)?;
    let fraction = digits_to_u256(kept, original)?
        .checked_mul(padding)
        .ok_or_else(|| AmountError::Overflow(original.to_string()))?;

    integer
        .checked_mul(scale)
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(|| AmountError::Overflow(original.to_string()))
}

/// Parse a base-unit integer string as stored by the backend
pub fn parse_base_units(raw: &str) -> Result<U256, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative(trimmed.to_string()));
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::Invalid(trimmed.to_string()));
    }
    digits_to_u256(trimmed, trimmed)
}

fn zero_padded(value: U256, width: usize) -> String {
    format!("{:0>width$}", value.to_string(), width = width)
}

/// Exact decimal rendering of a base-unit amount: no grouping, no rounding,
/// trailing fractional zeros trimmed.
pub fn format_token_amount_raw(amount: U256, decimals: u8) -> Result<String, AmountError> {
    let scale = pow10(decimals)?;
    let integer = amount / scale;
    let remainder = amount % scale;

    if remainder.is_zero() {
        return Ok(integer.to_string());
    }

    let fraction = zero_padded(remainder, decimals as usize);
    Ok(format!("{}.{}", integer, fraction.trim_end_matches('0')))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Display rendering of a typed base-unit amount.
///
/// The integer part is grouped in thousands and the fraction is rounded
/// half-up to three digits, matching the dashboards' en-US formatting.
pub fn format_base_units(amount: U256, decimals: u8) -> Result<String, AmountError> {
    let scale = pow10(decimals)?;
    let mut integer = amount / scale;
    let remainder = amount % scale;

    let (fraction, width) = if decimals <= DISPLAY_FRACTION_DIGITS {
        (remainder, decimals as usize)
    } else {
        let dropped = pow10(decimals - DISPLAY_FRACTION_DIGITS)?;
        let mut kept = remainder / dropped;
        let rest = remainder % dropped;
        // half-up; `rest >= dropped / 2` without overflowing
        if rest >= dropped - rest {
            kept += U256::from(1u64);
            if kept == U256::from(1000u64) {
                kept = U256::ZERO;
                integer = integer.saturating_add(U256::from(1u64));
            }
        }
        (kept, DISPLAY_FRACTION_DIGITS as usize)
    };

    let grouped = group_thousands(&integer.to_string());
    if fraction.is_zero() {
        return Ok(grouped);
    }
    let fraction = zero_padded(fraction, width);
    Ok(format!("{}.{}", grouped, fraction.trim_end_matches('0')))
}

/// Display rendering of a backend-supplied base-unit string.
///
/// Never fails: malformed input renders as `"0"`.
pub fn format_token_amount(amount: &str, decimals: u8) -> String {
    match parse_base_units(amount).and_then(|value| format_base_units(value, decimals)) {
        Ok(text) => text,
        Err(e) => {
            warn!(amount, decimals, error = %e, "Unformattable token amount");
            "0".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(s: &str) -> U256 {
        U256::from_str_radix(s, 10).unwrap()
    }

    #[test]
    fn test_parse_token_amount_examples() {
        assert_eq!(
            parse_token_amount("10.5", 18).unwrap(),
            u("10500000000000000000")
        );
        assert_eq!(parse_token_amount("0", 18).unwrap(), U256::ZERO);
        assert_eq!(parse_token_amount("0", 0).unwrap(), U256::ZERO);
        assert_eq!(parse_token_amount(" 42 ", 2).unwrap(), U256::from(4200u64));
        assert_eq!(parse_token_amount(".5", 1).unwrap(), U256::from(5u64));
        assert_eq!(parse_token_amount("7.", 3).unwrap(), U256::from(7000u64));
    }

    #[test]
    fn test_parse_token_amount_truncates() {
        assert_eq!(parse_token_amount("1.999999", 0).unwrap(), U256::from(1u64));
        assert_eq!(parse_token_amount("0.129", 2).unwrap(), U256::from(12u64));
    }

    #[test]
    fn test_parse_token_amount_rejects_garbage() {
        assert_eq!(parse_token_amount("", 18), Err(AmountError::Empty));
        assert!(matches!(
            parse_token_amount("-1", 18),
            Err(AmountError::Negative(_))
        ));
        assert!(matches!(
            parse_token_amount("1e5", 18),
            Err(AmountError::Invalid(_))
        ));
        assert!(matches!(
            parse_token_amount(".", 18),
            Err(AmountError::Invalid(_))
        ));
        assert_eq!(
            parse_token_amount("1", 78),
            Err(AmountError::DecimalsOutOfRange(78))
        );
        // 2^256 is one past the maximum
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(matches!(
            parse_token_amount(too_big, 0),
            Err(AmountError::Overflow(_))
        ));
    }

    #[test]
    fn test_format_token_amount_examples() {
        assert_eq!(format_token_amount("10500000000000000000", 18), "10.5");
        assert_eq!(format_token_amount("0", 18), "0");
        assert_eq!(format_token_amount("1234567000000000000000000", 18), "1,234,567");
        assert_eq!(format_token_amount("123", 0), "123");
        assert_eq!(format_token_amount("1000", 0), "1,000");
        assert_eq!(format_token_amount("12345", 2), "123.45");
    }

    #[test]
    fn test_format_token_amount_rounds_to_three_places() {
        // 1.23456 -> 1.235
        assert_eq!(format_token_amount("123456", 5), "1.235");
        // 0.0004 -> 0
        assert_eq!(format_token_amount("4", 4), "0");
        // 0.0005 -> 0.001
        assert_eq!(format_token_amount("5", 4), "0.001");
        // 999.9996 carries into the integer part
        assert_eq!(format_token_amount("9999996", 4), "1,000");
    }

    #[test]
    fn test_format_token_amount_never_fails() {
        assert_eq!(format_token_amount("not a number", 18), "0");
        assert_eq!(format_token_amount("-5", 18), "0");
        assert_eq!(format_token_amount("", 18), "0");
        assert_eq!(format_token_amount("5", 200), "0");
    }

    #[test]
    fn test_raw_format_round_trips() {
        let cases = [
            ("0", 18u8),
            ("1", 18),
            ("10500000000000000000", 18),
            ("123456789012345678901234567890", 18),
            ("999", 0),
            ("100", 2),
            ("5", 77),
        ];
        for (raw, decimals) in cases {
            let value = u(raw);
            let text = format_token_amount_raw(value, decimals).unwrap();
            assert_eq!(
                parse_token_amount(&text, decimals).unwrap(),
                value,
                "round trip of {raw} at {decimals} decimals via {text}"
            );
        }
        assert_eq!(
            format_token_amount_raw(u("10500000000000000000"), 18).unwrap(),
            "10.5"
        );
        assert_eq!(format_token_amount_raw(U256::MAX, 0).unwrap(), U256::MAX.to_string());
    }

    #[test]
    fn test_is_positive() {
        assert!(is_positive("0.0001").unwrap());
        assert!(is_positive("12").unwrap());
        assert!(!is_positive("0").unwrap());
        assert!(!is_positive("0.000").unwrap());
        assert!(is_positive("abc").is_err());
    }
}
