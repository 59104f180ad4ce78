//! # Ledger Terminal - Library Root
//!
//! Native desktop client for a double-entry financial ledger cluster.
//! This library crate contains all modules used by the binary crate (`main.rs`).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ UI thread (egui)                                             │
//! │   ui::render ──► App::command ──► handlers ──► ConnectionHandle
//! │   App::on_tick ◄── AppEvent ◄── Dispatcher ◄──────────┐      │
//! └───────────────────────────────────────────────────────┼──────┘
//!                                                         │
//! ┌───────────────────────────────────────────────────────┼──────┐
//! │ client IO thread                                      │      │
//! │   completion callback ──► WorkerBridge                │      │
//! │        decode ──► Staging + ResultMailbox ──► dispatch┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The IO thread never touches [`AppState`]: results cross over through the
//! staging buffers and the single-slot mailbox, and only a sequence number
//! travels on the event channel.
//!
//! ## Modules
//!
//! - **app**: state, connection state machine, operation guard, entity sync
//! - **services::ledger**: client binding, request pool, sequencer, simulator
//! - **ui**: egui rendering
//! - **core**: configuration and errors
//! - **debug**: file logging and event tracking
//! - **utils**: timer runtime and input validation
//!
//! ## Testing
//!
//! ```bash
//! cargo test -p ledger-terminal
//! ```
//!
//! Tests run against [`services::ledger::SimulatedLedger`]; build with
//! `--features native-client` to link the real client library.

pub mod app;
pub mod core;
pub mod debug;
pub mod services;
pub mod ui;
pub mod utils;

pub use app::{App, AppEvent, AppState, Command};
pub use core::{AppError, Result};
