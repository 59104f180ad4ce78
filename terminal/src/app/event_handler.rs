//! # Event Handler
//!
//! Applies events drained from the event channel to [`AppState`](crate::app::AppState).
//!
//! Completion events carry only a sequence number; the result itself is taken
//! from the mailbox, and record data from the staging buffers.

use std::sync::Arc;

use crate::app::{App, AppEvent, Command};
use crate::services::ledger::{Delivery, OperationResult};

/// Trait for event handling implementation
pub(crate) trait AppEventHandler {
    fn handle_event_impl(&mut self, event: AppEvent);
}

impl AppEventHandler for App {
    fn handle_event_impl(&mut self, event: AppEvent) {
        crate::debug::track_event_receive(event.name());

        match event {
            AppEvent::Completion { sequence } => self.handle_completion(sequence),
            AppEvent::Resubmit(submission) => self.run_submission(submission),
            AppEvent::WatchdogCheck { sequence } => self.handle_watchdog(sequence),
        }
    }
}

impl App {
    fn handle_completion(&mut self, sequence: u32) {
        let bridge = Arc::clone(self.bridge());

        if !self.state.connection.can_submit() {
            bridge.mailbox.clear();
            tracing::debug!(sequence, "Completion after disconnect - discarded");
            return;
        }

        let Some(Delivery { sequence: delivered, result }) = bridge.mailbox.take() else {
            tracing::debug!(sequence, "Completion with empty mailbox - already handled");
            return;
        };

        if self.state.operation.sequence() != Some(delivered) {
            tracing::debug!(
                delivered,
                active = ?self.state.operation.sequence(),
                "Stale result - discarded"
            );
            return;
        }

        match result {
            OperationResult::QueryAccounts { count } => {
                let staged = bridge.staging.accounts.lock();
                let records = &staged.as_slice()[..count.min(staged.len())];
                let report = self.state.accounts.sync(records);
                drop(staged);
                tracing::info!(sequence = delivered, ?report, "Accounts synchronized");
                self.prune_transfer_form();
                self.state.operation.complete();
                // One operation at a time: the transfer list follows the account list.
                if std::mem::take(&mut self.state.refresh_transfers) {
                    if let Some(account_id) = self.state.transfers_account {
                        self.defer_command(Command::GetAccountTransfers { account_id });
                    }
                }
            }
            OperationResult::LookupAccounts { count } => {
                let staged = bridge.staging.accounts.lock();
                let records = &staged.as_slice()[..count.min(staged.len())];
                let refreshed = self.state.accounts.refresh(records, |current, fresh| current.id == fresh.id);
                drop(staged);
                tracing::debug!(sequence = delivered, refreshed, "Accounts refreshed");
                self.state.operation.complete();
            }
            OperationResult::GetAccountTransfers { count } => {
                let staged = bridge.staging.transfers.lock();
                let records = &staged.as_slice()[..count.min(staged.len())];
                let report = self.state.transfers.sync(records);
                drop(staged);
                tracing::info!(sequence = delivered, ?report, "Transfers synchronized");
                self.state.operation.complete();
            }
            OperationResult::CreateAccount(Ok(())) | OperationResult::CreateTransfer(Ok(())) => {
                tracing::info!(sequence = delivered, operation = ?self.state.operation.active(), "Create succeeded");
                self.state.operation.complete();
                self.defer_command(Command::QueryAccounts);
                self.state.refresh_transfers = self.state.transfers_account.is_some();
            }
            OperationResult::CreateAccount(Err(code)) => {
                tracing::warn!(sequence = delivered, ?code, "Account rejected");
                self.state.operation.complete();
                self.state.operation.set_error(code.message());
            }
            OperationResult::CreateTransfer(Err(code)) => {
                tracing::warn!(sequence = delivered, ?code, "Transfer rejected");
                self.state.operation.complete();
                self.state.operation.set_error(code.message());
            }
            OperationResult::Failed { reason } => {
                self.state.operation.fail(reason.to_string());
            }
        }
    }

    fn handle_watchdog(&mut self, sequence: u32) {
        let bridge = Arc::clone(self.bridge());
        if bridge.sequencer.has_completed(sequence) || self.state.operation.sequence() != Some(sequence) {
            return;
        }

        let timeout = self.config.watchdog_timeout();
        tracing::warn!(sequence, timeout_ms = timeout.as_millis() as u64, "Request timed out");
        bridge.sequencer.retire(sequence);
        self.state
            .operation
            .fail(format!("Ledger did not respond within {:.1}s", timeout.as_secs_f64()));
    }

    /// Forget form selections that no longer name a visible account.
    fn prune_transfer_form(&mut self) {
        let form = &mut self.state.transfer_form;
        let accounts = &self.state.accounts;
        for selection in [&mut form.debit_account_id, &mut form.credit_account_id] {
            if selection.is_some_and(|id| !accounts.iter().any(|account| account.id == id)) {
                *selection = None;
            }
        }
    }
}
