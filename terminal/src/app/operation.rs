//! # Operation Guard
//!
//! At most one ledger operation is in flight. The guard tracks which one, the
//! sequence it was submitted under, and the last user-visible error.
//!
//! ```text
//! None ──begin──▶ active ──attach(seq)──▶ active(seq) ──complete/fail──▶ None
//!                   │
//!                   └──reset (rate limited / backpressure)──▶ None
//! ```

use shared::ledger::{Account, Transfer};
use thiserror::Error;

use super::connection::ConnectionState;

/// The operation currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    None,
    QueryAccounts,
    LookupAccounts {
        account_id: u128,
    },
    CreateAccount {
        id: u128,
    },
    CreateTransfer {
        amount: u128,
    },
    GetAccountTransfers {
        account_id: u128,
    },
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Operation::None => "Idle",
            Operation::QueryAccounts => "Loading accounts",
            Operation::LookupAccounts { .. } => "Refreshing account",
            Operation::CreateAccount { .. } => "Creating account",
            Operation::CreateTransfer { .. } => "Creating transfer",
            Operation::GetAccountTransfers { .. } => "Loading transfers",
        }
    }
}

/// Everything needed to (re)submit one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    QueryAccounts,
    LookupAccounts { account_id: u128 },
    CreateAccount { account: Account },
    CreateTransfer { transfer: Transfer },
    GetAccountTransfers { account_id: u128 },
}

impl Submission {
    pub fn operation(&self) -> Operation {
        match self {
            Submission::QueryAccounts => Operation::QueryAccounts,
            Submission::LookupAccounts { account_id } => Operation::LookupAccounts {
                account_id: *account_id,
            },
            Submission::CreateAccount { account } => Operation::CreateAccount { id: account.id },
            Submission::CreateTransfer { transfer } => Operation::CreateTransfer {
                amount: transfer.amount,
            },
            Submission::GetAccountTransfers { account_id } => Operation::GetAccountTransfers {
                account_id: *account_id,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("Not connected to the ledger")]
    NotReady,

    #[error("Another operation is in progress")]
    Busy,
}

#[derive(Debug, Default)]
pub struct OperationGuard {
    active: Operation,
    sequence: Option<u32>,
    last_error: Option<String>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard for `operation`. Clears the last error on success.
    pub fn begin(&mut self, connection: ConnectionState, operation: Operation) -> Result<(), OperationError> {
        if connection != ConnectionState::Ready {
            return Err(OperationError::NotReady);
        }
        if self.is_active() {
            return Err(OperationError::Busy);
        }
        self.active = operation;
        self.sequence = None;
        self.last_error = None;
        Ok(())
    }

    /// Record the sequence the active operation was submitted under.
    pub fn attach(&mut self, sequence: u32) {
        debug_assert!(self.is_active(), "attach without an active operation");
        self.sequence = Some(sequence);
    }

    pub fn sequence(&self) -> Option<u32> {
        self.sequence
    }

    pub fn active(&self) -> Operation {
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active != Operation::None
    }

    pub fn complete(&mut self) {
        debug_assert!(self.is_active(), "complete without an active operation");
        if !self.is_active() {
            tracing::warn!("Completion arrived with no active operation");
        }
        self.reset();
    }

    /// End the active operation and surface `message`.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(operation = ?self.active, sequence = ?self.sequence, %message, "Operation failed");
        self.reset();
        self.last_error = Some(message);
    }

    /// Release the guard without touching the last error.
    pub fn reset(&mut self) {
        self.active = Operation::None;
        self.sequence = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_requires_ready_connection() {
        let mut guard = OperationGuard::new();
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Registering,
        ] {
            assert_eq!(guard.begin(state, Operation::QueryAccounts), Err(OperationError::NotReady));
        }
        assert!(!guard.is_active());
    }

    #[test]
    fn test_second_begin_is_busy() {
        let mut guard = OperationGuard::new();
        guard.begin(ConnectionState::Ready, Operation::QueryAccounts).unwrap();
        assert_eq!(
            guard.begin(ConnectionState::Ready, Operation::CreateAccount { id: 1 }),
            Err(OperationError::Busy)
        );
        assert_eq!(guard.active(), Operation::QueryAccounts);
    }

    #[test]
    fn test_lifecycle() {
        let mut guard = OperationGuard::new();
        guard.set_error("old");
        guard.begin(ConnectionState::Ready, Operation::QueryAccounts).unwrap();
        assert_eq!(guard.last_error(), None);

        guard.attach(7);
        assert_eq!(guard.sequence(), Some(7));
        guard.complete();
        assert!(!guard.is_active());
        assert_eq!(guard.sequence(), None);

        guard.begin(ConnectionState::Ready, Operation::QueryAccounts).unwrap();
        guard.fail("Ledger did not respond");
        assert!(!guard.is_active());
        assert_eq!(guard.last_error(), Some("Ledger did not respond"));
    }

    #[test]
    fn test_submission_operation() {
        let transfer = Transfer::new(9, 1, 2, 500, 1, 1);
        assert_eq!(
            Submission::CreateTransfer { transfer }.operation(),
            Operation::CreateTransfer { amount: 500 }
        );
        assert_eq!(Submission::QueryAccounts.operation().label(), "Loading accounts");
    }
}
