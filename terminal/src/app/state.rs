//! # Application State Types
//!
//! Everything the UI renders. Owned by [`crate::app::App`] and only touched on
//! the UI thread; the IO thread communicates through the worker bridge.

use std::sync::Arc;

use shared::ledger::{Account, Transfer};

use super::connection::Connection;
use super::entities::EntityCollection;
use super::operation::OperationGuard;
use crate::services::ledger::ClientDriver;

/// Inputs of the transfer form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub debit_account_id: Option<u128>,
    pub credit_account_id: Option<u128>,
    /// Decimal text as typed by the user.
    pub amount: String,
}

impl TransferForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug)]
pub struct AppState {
    pub connection: Connection,
    pub operation: OperationGuard,
    pub accounts: EntityCollection<Account>,
    pub transfers: EntityCollection<Transfer>,
    /// Account whose transfers are currently listed.
    pub transfers_account: Option<u128>,
    /// Reload `transfers_account` once the next account query lands.
    pub refresh_transfers: bool,
    pub transfer_form: TransferForm,
    pub debug_overlay_visible: bool,
}

impl AppState {
    pub fn new(driver: Arc<dyn ClientDriver>) -> Self {
        Self {
            connection: Connection::new(driver),
            operation: OperationGuard::new(),
            accounts: EntityCollection::in_memory(),
            transfers: EntityCollection::in_memory(),
            transfers_account: None,
            refresh_transfers: false,
            transfer_form: TransferForm::default(),
            debug_overlay_visible: crate::debug::DebugConfig::from_env().show_debug_ui,
        }
    }

    /// Drop every mirrored record.
    pub fn clear_entities(&mut self) {
        self.accounts.clear();
        self.transfers.clear();
        self.transfers_account = None;
        self.refresh_transfers = false;
    }

    pub fn account(&self, id: u128) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }
}
