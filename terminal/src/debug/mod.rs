//! # Debugging and Tracing Infrastructure
//!
//! File-based logging and event-flow tracking for the ledger terminal.
//!
//! ## Features
//!
//! - **File-based logging**: Structured logs to `logs/ledger-terminal.log` (daily rotation)
//! - **Event monitoring**: Every [`AppEvent`](crate::app::AppEvent) dispatch and receipt,
//!   with a ring buffer shown by the in-UI debug overlay
//! - **Panic capture**: Panics are written to the log before the default hook runs
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (e.g., `ledger_terminal=debug,info`)
//! - `LEDGER_LOG_DIR`: Log directory (default: `logs`)
//! - `LEDGER_DEBUG_UI`: Enable in-UI debug overlay (1=on, 0=off)

pub mod config;
pub mod event_tracker;
pub mod logger;

pub use config::DebugConfig;
pub use event_tracker::{
    log_event_stats, pending_event_count, recent_events, total_event_count, track_event_receive,
    track_event_send, EventInfo,
};
pub use logger::init as init_logger;

/// Initialize the debugging system. Call once, before anything logs.
pub fn init() {
    init_logger();
}

/// Check if debug mode is enabled via feature flag
pub fn is_debug_mode() -> bool {
    cfg!(feature = "debug-mode")
}
