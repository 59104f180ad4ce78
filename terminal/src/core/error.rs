//! # Common Error Types
//!
//! Consolidated error handling for the ledger terminal.
//!
//! Each layer keeps its own closed error enum next to the code that raises it;
//! [`AppError`] wraps them at the application boundary.
//!
//! ## Error Categories
//!
//! - **Connect**: client initialization failed (see [`ConnectError`])
//! - **Operation**: the operation guard refused a submission (see [`OperationError`])
//! - **Submit**: a request could not be handed to the client (see [`SubmitError`])
//! - **Config**: configuration file could not be read or parsed
//! - **State**: an action that does not fit the current connection state
//! - **Validation**: user input rejected before anything is submitted
//!
//! Transport failures reported by the client on the IO thread never surface as
//! `AppError`; they travel to the UI as
//! [`OperationResult::Failed`](crate::services::ledger::OperationResult::Failed).
//!
//! ## Usage Pattern
//!
//! ```rust,no_run
//! use ledger_terminal::core::error::{AppError, Result};
//!
//! fn require_amount(amount: u128) -> Result<u128> {
//!     if amount == 0 {
//!         return Err(AppError::Validation("Amount must be greater than zero".to_string()));
//!     }
//!     Ok(amount)
//! }
//! ```

use shared::utils::AmountError;
use thiserror::Error;

use crate::app::operation::OperationError;
use crate::services::ledger::{ConnectError, SubmitError};

/// Application-wide error type.
///
/// # Example
///
/// ```rust
/// use ledger_terminal::core::error::AppError;
/// use ledger_terminal::services::ledger::ConnectError;
///
/// let err = AppError::from(ConnectError::InvalidAddress);
/// assert_eq!(err.to_string(), "Connection failed: Invalid ledger address");
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Client initialization failed.
    #[error("Connection failed: {0}")]
    Connect(#[from] ConnectError),

    /// The operation guard refused the submission.
    ///
    /// Both variants are backpressure; callers normally log and drop these.
    #[error("{0}")]
    Operation(#[from] OperationError),

    /// The request could not be handed to the client.
    #[error("Submit failed: {0}")]
    Submit(#[from] SubmitError),

    /// Configuration file could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    #[error("State error: {0}")]
    State(String),

    /// User input rejected before submission.
    ///
    /// - Missing or identical debit/credit accounts
    /// - Amount that does not parse or is zero
    #[error("{0}")]
    Validation(String),
}

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<AmountError> for AppError {
    fn from(err: AmountError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_shown_verbatim() {
        let err = AppError::from(AmountError::Zero);
        assert_eq!(err.to_string(), "Amount must be greater than zero");
    }

    #[test]
    fn test_submit_error_wraps() {
        let err = AppError::from(SubmitError::Invalid);
        assert!(matches!(err, AppError::Submit(SubmitError::Invalid)));
        assert!(err.to_string().starts_with("Submit failed"));
    }
}
