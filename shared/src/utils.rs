//! # Shared Utility Functions
//!
//! Display and input helpers for ledger values.
//!
//! ## Amounts
//!
//! Ledger amounts are unsigned integers in minor units. A `scale` of 2 means
//! `12345` is shown as `123.45`:
//! - [`format_amount`] / [`format_signed_amount`] - minor units to text
//! - [`parse_amount`] - user text to minor units
//!
//! ## Identifiers
//!
//! - [`abbreviate`] - first N and last M characters with an ellipsis
//! - [`short_id`] - hexadecimal id abbreviated for tables
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::{format_amount, parse_amount};
//!
//! assert_eq!(format_amount(12345, 2), "123.45");
//! assert_eq!(parse_amount("123.45", 2).unwrap(), 12345);
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from [`parse_amount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("'{0}' is not a valid amount")]
    Invalid(String),

    #[error("At most {scale} decimal places are allowed")]
    TooPrecise { scale: u32 },

    #[error("Amount is too large")]
    Overflow,

    #[error("Amount must be greater than zero")]
    Zero,
}

/// Show the first `prefix_len` and last `suffix_len` characters of `text`.
///
/// Text too short to abbreviate is returned unchanged.
///
/// ```rust
/// use shared::utils::abbreviate;
///
/// assert_eq!(abbreviate("0123456789abcdef", 4, 4), "0123...cdef");
/// assert_eq!(abbreviate("short", 4, 4), "short");
/// ```
pub fn abbreviate(text: &str, prefix_len: usize, suffix_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= prefix_len + suffix_len {
        return text.to_string();
    }

    let prefix: String = chars[..prefix_len].iter().collect();
    let suffix: String = chars[chars.len() - suffix_len..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// Hexadecimal id, abbreviated once it no longer fits in a table cell.
pub fn short_id(id: u128) -> String {
    abbreviate(&format!("{:x}", id), 6, 4)
}

/// Render minor units with `scale` decimal places.
pub fn format_amount(amount: u128, scale: u32) -> String {
    if scale == 0 {
        return amount.to_string();
    }
    let divisor = 10u128.pow(scale);
    format!(
        "{}.{:0width$}",
        amount / divisor,
        amount % divisor,
        width = scale as usize
    )
}

/// Render a signed balance with `scale` decimal places.
pub fn format_signed_amount(amount: i128, scale: u32) -> String {
    let magnitude = format_amount(amount.unsigned_abs(), scale);
    if amount < 0 {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// Parse user input such as `"12.5"` into minor units.
///
/// Zero is rejected since the ledger does not accept empty transfers.
pub fn parse_amount(input: &str, scale: u32) -> Result<u128, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AmountError::Invalid(trimmed.to_string()));
    }
    if fraction.len() > scale as usize {
        return Err(AmountError::TooPrecise { scale });
    }

    let whole_units: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Overflow)?
    };
    let fraction_units: u128 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = scale as usize);
        padded.parse().map_err(|_| AmountError::Overflow)?
    };

    let amount = whole_units
        .checked_mul(10u128.pow(scale))
        .and_then(|units| units.checked_add(fraction_units))
        .ok_or(AmountError::Overflow)?;

    if amount == 0 {
        return Err(AmountError::Zero);
    }
    Ok(amount)
}

/// Render a cluster timestamp (nanoseconds since the Unix epoch) as UTC.
///
/// Zero means the record has not been committed yet.
pub fn format_timestamp(timestamp_ns: u64) -> String {
    if timestamp_ns == 0 {
        return "-".to_string();
    }
    let nanos = i64::try_from(timestamp_ns).unwrap_or(i64::MAX);
    let time: DateTime<Utc> = DateTime::from_timestamp_nanos(nanos);
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("0123456789abcdef", 4, 4), "0123...cdef");
        assert_eq!(abbreviate("0123456789abcdef", 2, 2), "01...ef");
        assert_eq!(abbreviate("abc", 4, 4), "abc");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id(0xff), "ff");
        assert_eq!(short_id(0x1234_5678_9abc_def0), "123456...def0");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(12345, 2), "123.45");
        assert_eq!(format_amount(5, 2), "0.05");
        assert_eq!(format_amount(700, 0), "700");
        assert_eq!(format_signed_amount(-150, 2), "-1.50");
        assert_eq!(format_signed_amount(150, 2), "1.50");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.5", 2), Ok(1250));
        assert_eq!(parse_amount(" 7 ", 2), Ok(700));
        assert_eq!(parse_amount(".25", 2), Ok(25));
        assert_eq!(parse_amount("3", 0), Ok(3));
    }

    #[test]
    fn test_parse_amount_rejects_bad_input() {
        assert_eq!(parse_amount("", 2), Err(AmountError::Empty));
        assert_eq!(parse_amount("0.00", 2), Err(AmountError::Zero));
        assert_eq!(parse_amount("1.234", 2), Err(AmountError::TooPrecise { scale: 2 }));
        assert_eq!(parse_amount("-5", 2), Err(AmountError::Invalid("-5".to_string())));
        assert_eq!(parse_amount(".", 2), Err(AmountError::Invalid(".".to_string())));
        assert_eq!(
            parse_amount("999999999999999999999999999999999999999999", 2),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "-");
        assert_eq!(format_timestamp(1_700_000_000_000_000_000), "2023-11-14 22:13:20");
    }
}
