//! # Application Events
//!
//! Messages delivered to the UI thread through the event channel, and the
//! commands the UI issues in response to user input.

use crate::app::operation::Submission;

/// Events drained by [`crate::app::App::on_tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The IO thread deposited the result for `sequence` in the mailbox.
    Completion { sequence: u32 },
    /// A submission deferred by the rate limiter is due to be retried.
    Resubmit(Submission),
    /// `sequence` has been in flight for the watchdog timeout.
    WatchdogCheck { sequence: u32 },
}

impl AppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Completion { .. } => "Completion",
            Self::Resubmit(_) => "Resubmit",
            Self::WatchdogCheck { .. } => "WatchdogCheck",
        }
    }
}

/// User intents, bound to handlers by [`crate::app::App::command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Disconnect,
    QueryAccounts,
    CreateAccount,
    CreateTransfer {
        debit_account_id: u128,
        credit_account_id: u128,
        amount: u128,
    },
    GetAccountTransfers { account_id: u128 },
    /// Re-read one account without reloading the whole list.
    RefreshAccount { account_id: u128 },
    /// Validate the transfer form and submit it.
    SubmitTransferForm,
}
