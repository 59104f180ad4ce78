//! # Ledger Handlers
//!
//! Submission path shared by every ledger operation:
//!
//! 1. claim the operation guard (`NotReady`/`Busy` are dropped quietly)
//! 2. if the rate limiter says no, release the guard and resubmit after the settle delay
//! 3. take a sequence number and hand the request to the client
//! 4. on success attach the sequence and arm the watchdog
//!
//! Results come back through [`crate::app::App::on_tick`].

use std::sync::Arc;

use rand::Rng;
use shared::ledger::{Account, AccountFilter, QueryFilter, Transfer};
use shared::utils::parse_amount;

use crate::app::operation::Submission;
use crate::app::{App, AppEvent};
use crate::core::error::{AppError, Result};
use crate::services::ledger::SubmitError;
use crate::utils::validation::validate_transfer_accounts;

/// What happened to a submission that was not refused outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted { sequence: u32 },
    /// Rate limited; an [`AppEvent::Resubmit`] is scheduled.
    Deferred,
    /// No free request slot; dropped.
    Backpressure,
}

pub fn submit(app: &mut App, submission: Submission) -> Result<SubmitOutcome> {
    let connection = app.state.connection.state();
    app.state.operation.begin(connection, submission.operation())?;

    let bridge = Arc::clone(app.bridge());
    if bridge.sequencer.should_rate_limit() {
        app.state.operation.reset();
        let delay = app.config.settle_delay();
        tracing::debug!(
            ?submission,
            delay_ms = delay.as_millis() as u64,
            remaining_gap_ms = bridge.sequencer.remaining_gap().as_millis() as u64,
            "Rate limited - resubmitting after settle delay"
        );
        bridge.dispatcher().dispatch_after(delay, AppEvent::Resubmit(submission));
        return Ok(SubmitOutcome::Deferred);
    }

    let Some(handle) = app.state.connection.handle() else {
        app.state.operation.reset();
        return Err(AppError::State("Ready without a client handle".to_string()));
    };

    let sequence = bridge.sequencer.next_sequence();
    let sent = match &submission {
        Submission::QueryAccounts => handle.query_accounts(
            sequence,
            &QueryFilter::for_ledger(app.config.ledger, app.config.query_limit),
        ),
        Submission::LookupAccounts { account_id } => {
            handle.lookup_accounts(sequence, std::slice::from_ref(account_id))
        }
        Submission::CreateAccount { account } => {
            handle.create_accounts(sequence, std::slice::from_ref(account))
        }
        Submission::CreateTransfer { transfer } => {
            handle.create_transfers(sequence, std::slice::from_ref(transfer))
        }
        Submission::GetAccountTransfers { account_id } => handle.get_account_transfers(
            sequence,
            &AccountFilter::for_account(*account_id, app.config.transfer_limit),
        ),
    };

    match sent {
        Ok(()) => {
            app.state.operation.attach(sequence);
            bridge.dispatcher().dispatch_after(
                app.config.watchdog_timeout(),
                AppEvent::WatchdogCheck { sequence },
            );
            Ok(SubmitOutcome::Submitted { sequence })
        }
        Err(SubmitError::PoolExhausted) => {
            app.state.operation.reset();
            bridge.sequencer.retire(sequence);
            tracing::warn!(pool = ?bridge.pool.stats(), "Request pool exhausted - submission dropped");
            Ok(SubmitOutcome::Backpressure)
        }
        Err(err) => {
            app.state.operation.reset();
            bridge.sequencer.retire(sequence);
            Err(err.into())
        }
    }
}

pub fn create_account(app: &mut App) -> Result<SubmitOutcome> {
    let account = Account::new(new_id(), app.config.ledger, app.config.account_code);
    submit(app, Submission::CreateAccount { account })
}

pub fn create_transfer(
    app: &mut App,
    debit_account_id: u128,
    credit_account_id: u128,
    amount: u128,
) -> Result<SubmitOutcome> {
    if let Some(message) = validate_transfer_accounts(debit_account_id, credit_account_id).error {
        return Err(AppError::Validation(message));
    }
    if amount == 0 {
        return Err(AppError::Validation("Amount must be greater than zero".to_string()));
    }

    let transfer = Transfer::new(
        new_id(),
        debit_account_id,
        credit_account_id,
        amount,
        app.config.ledger,
        app.config.transfer_code,
    );
    submit(app, Submission::CreateTransfer { transfer })
}

/// Parse the transfer form and submit it. The amount is cleared once the
/// transfer is sent or queued for resubmission.
pub fn submit_transfer_form(app: &mut App) -> Result<SubmitOutcome> {
    let form = app.state.transfer_form.clone();
    let (Some(debit), Some(credit)) = (form.debit_account_id, form.credit_account_id) else {
        return Err(AppError::Validation("Select both accounts".to_string()));
    };
    let amount = parse_amount(&form.amount, app.config.amount_scale)?;

    let outcome = create_transfer(app, debit, credit, amount)?;
    if matches!(outcome, SubmitOutcome::Submitted { .. } | SubmitOutcome::Deferred) {
        app.state.transfer_form.amount.clear();
    }
    Ok(outcome)
}

pub fn show_account_transfers(app: &mut App, account_id: u128) -> Result<SubmitOutcome> {
    let outcome = submit(app, Submission::GetAccountTransfers { account_id })?;
    if app.state.transfers_account != Some(account_id) {
        app.state.transfers.clear();
    }
    app.state.transfers_account = Some(account_id);
    Ok(outcome)
}

/// Random non-zero identifier.
fn new_id() -> u128 {
    let mut rng = rand::rng();
    loop {
        let id: u128 = rng.random();
        if id != 0 && id != u128::MAX {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_is_never_reserved() {
        for _ in 0..100 {
            let id = new_id();
            assert_ne!(id, 0);
            assert_ne!(id, u128::MAX);
        }
    }
}
