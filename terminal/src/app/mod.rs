//! # Application Orchestrator
//!
//! The main [`App`] struct owns the UI state and coordinates it with the ledger
//! client running on its own IO thread.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Main Thread (egui)                       │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │  App (orchestrator)                                  │   │
//! │  │  - command()   - user intents                        │   │
//! │  │  - on_tick()   - drain events, run deferred commands │   │
//! │  └────────────┬─────────────────────────────────────────┘   │
//! │               │ owns                                        │
//! │  ┌────────────▼─────────────────────────────────────────┐   │
//! │  │  AppState: connection, operation guard, entities     │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! └───────────────────────▲─────────────────────────────────────┘
//!                         │ async_channel (unbounded)
//!                         │ AppEvent::{Completion, Resubmit, WatchdogCheck}
//! ┌───────────────────────┴─────────────────────────────────────┐
//! │  Dispatcher (any thread)          tokio timers (delayed)    │
//! │       ▲                                                     │
//! │  WorkerBridge::on_completion  ◀── client IO thread          │
//! │  (pool release, staging, sequencer, mailbox)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The IO thread never touches [`AppState`]. It leaves results in the mailbox
//! and record copies in staging, then dispatches a [`AppEvent::Completion`].
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ledger_terminal::app::{App, Command};
//! use ledger_terminal::core::LedgerConfig;
//! use ledger_terminal::services::ledger::SimulatedLedger;
//!
//! let mut app = App::new(LedgerConfig::default(), Arc::new(SimulatedLedger::new()));
//! app.command(Command::Connect);
//! app.command(Command::QueryAccounts);
//!
//! // In the egui update loop:
//! app.on_tick();
//! for account in app.state.accounts.iter() {
//!     println!("{}", account.id);
//! }
//! ```

pub mod connection;
pub mod dispatch;
pub mod entities;
pub mod events;
pub mod operation;
pub mod state;

mod event_handler;
mod handlers;

pub use connection::{Connection, ConnectionState};
pub use entities::{EntityCollection, EntityRef, EntityStore, MemoryEntityStore, StoreError, SyncReport};
pub use events::{AppEvent, Command};
pub use handlers::ledger::SubmitOutcome;
pub use operation::{Operation, OperationError, OperationGuard, Submission};
pub use state::{AppState, TransferForm};

use std::collections::VecDeque;
use std::sync::Arc;

use async_channel::{unbounded, Receiver, Sender};

use crate::core::config::LedgerConfig;
use crate::core::error::{AppError, Result};
use crate::services::ledger::{ClientDriver, WorkerBridge};
use dispatch::Dispatcher;

/// Main application orchestrator.
///
/// Single owner of [`AppState`]; everything that happens on other threads
/// reaches it as an [`AppEvent`] drained by [`App::on_tick`].
pub struct App {
    pub state: AppState,

    /// Channel receiver for events from the IO thread and timers.
    ///
    /// Polled in `on_tick()` using `try_recv()` (non-blocking).
    pub event_rx: Receiver<AppEvent>,

    /// Kept so the channel stays open while no timer or client holds a sender.
    event_tx: Sender<AppEvent>,

    bridge: Arc<WorkerBridge>,
    config: LedgerConfig,

    /// Commands queued by event handling, run at the end of the tick.
    deferred: VecDeque<Command>,
}

impl App {
    pub fn new(config: LedgerConfig, driver: Arc<dyn ClientDriver>) -> Self {
        let (event_tx, event_rx) = unbounded();
        let bridge = Arc::new(WorkerBridge::new(&config, Dispatcher::new(event_tx.clone())));

        tracing::info!(
            driver = driver.name(),
            address = %config.address,
            pool_capacity = config.pool_capacity,
            "App state initialized"
        );

        Self {
            state: AppState::new(driver),
            event_rx,
            event_tx,
            bridge,
            config,
            deferred: VecDeque::new(),
        }
    }

    pub fn bridge(&self) -> &Arc<WorkerBridge> {
        &self.bridge
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn event_tx(&self) -> Sender<AppEvent> {
        self.event_tx.clone()
    }

    /// Called whenever an event is queued for the UI thread.
    pub fn set_repaint_hook<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.bridge.dispatcher().set_waker(hook);
    }

    /// Called every frame: drain pending events, then run deferred commands.
    pub fn on_tick(&mut self) {
        let started = std::time::Instant::now();
        let mut events_processed = 0u32;

        while let Ok(event) = self.event_rx.try_recv() {
            events_processed += 1;
            self.handle_event(event);
        }

        // Only what was queued before this point; commands deferred while
        // running these wait for the next tick.
        for _ in 0..self.deferred.len() {
            if let Some(command) = self.deferred.pop_front() {
                self.command(command);
            }
        }

        if events_processed > 0 {
            let elapsed = started.elapsed();
            tracing::debug!(
                events_processed,
                processing_time_us = elapsed.as_micros() as u64,
                "on_tick: processed events"
            );
            if elapsed.as_millis() > 5 {
                tracing::warn!(
                    events_processed,
                    processing_time_ms = elapsed.as_millis() as u64,
                    "Event processing took longer than 5ms"
                );
            }
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        use event_handler::AppEventHandler;
        self.handle_event_impl(event);
    }

    /// Run a user intent. Failures end up in the operation's last error;
    /// backpressure is only logged.
    pub fn command(&mut self, command: Command) {
        tracing::debug!(?command, "Command");
        let result = match command {
            Command::Connect => handlers::connection::connect(self),
            Command::Disconnect => {
                handlers::connection::disconnect(self);
                Ok(())
            }
            Command::QueryAccounts => handlers::ledger::submit(self, Submission::QueryAccounts).map(drop),
            Command::CreateAccount => handlers::ledger::create_account(self).map(drop),
            Command::CreateTransfer {
                debit_account_id,
                credit_account_id,
                amount,
            } => handlers::ledger::create_transfer(self, debit_account_id, credit_account_id, amount)
                .map(drop),
            Command::GetAccountTransfers { account_id } => {
                handlers::ledger::show_account_transfers(self, account_id).map(drop)
            }
            Command::RefreshAccount { account_id } => {
                handlers::ledger::submit(self, Submission::LookupAccounts { account_id }).map(drop)
            }
            Command::SubmitTransferForm => handlers::ledger::submit_transfer_form(self).map(drop),
        };
        self.report(result);
    }

    /// Queue `command` to run at the end of the current tick.
    pub fn defer_command(&mut self, command: Command) {
        self.deferred.push_back(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.deferred.len()
    }

    fn run_submission(&mut self, submission: Submission) {
        let result = handlers::ledger::submit(self, submission).map(drop);
        self.report(result);
    }

    fn report(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {}
            Err(AppError::Operation(err)) => {
                tracing::debug!(error = %err, "Submission dropped");
            }
            Err(err) => {
                tracing::warn!(error = %err, "Command failed");
                self.state.operation.set_error(err.to_string());
            }
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("state", &self.state)
            .field("bridge", &self.bridge)
            .field("deferred", &self.deferred)
            .finish()
    }
}
