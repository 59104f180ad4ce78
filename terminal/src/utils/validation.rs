//! Validation utilities for user input

use shared::utils::parse_amount;

/// Most replica addresses a client accepts.
pub const MAX_ADDRESSES: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

/// Validate a comma-separated replica list: each entry is `port` or `host:port`.
pub fn validate_address(address: &str) -> ValidationResult {
    let entries: Vec<&str> = address.split(',').map(str::trim).collect();
    if entries.iter().all(|entry| entry.is_empty()) {
        return ValidationResult::err("Address is required");
    }
    if entries.len() > MAX_ADDRESSES {
        return ValidationResult::err(format!("At most {} replica addresses", MAX_ADDRESSES));
    }

    for entry in entries {
        let (host, port) = match entry.rsplit_once(':') {
            Some((host, port)) => (Some(host), port),
            None => (None, entry),
        };
        if host.is_some_and(str::is_empty) {
            return ValidationResult::err(format!("Missing host in '{}'", entry));
        }
        if port.parse::<u16>().map_or(true, |port| port == 0) {
            return ValidationResult::err(format!("Invalid port in '{}'", entry));
        }
    }
    ValidationResult::ok()
}

/// Validate a decimal amount with at most `scale` fractional digits.
pub fn validate_amount(amount: &str, scale: u32) -> ValidationResult {
    match parse_amount(amount, scale) {
        Ok(_) => ValidationResult::ok(),
        Err(err) => ValidationResult::err(err.to_string()),
    }
}

/// Validate the two sides of a transfer.
pub fn validate_transfer_accounts(debit_account_id: u128, credit_account_id: u128) -> ValidationResult {
    if debit_account_id == 0 || credit_account_id == 0 {
        return ValidationResult::err("Select both accounts");
    }
    if debit_account_id == credit_account_id {
        return ValidationResult::err("Debit and credit accounts must differ");
    }
    ValidationResult::ok()
}
