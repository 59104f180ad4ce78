//! # Core Abstractions
//!
//! Configuration and error types shared by every layer.
//!
//! - **[`config`]**: `LedgerConfig`, loaded from file and environment
//! - **[`error`]**: Application error types (`AppError`, `Result<T>`)
//!
//! The client itself is injected through
//! [`ClientDriver`](crate::services::ledger::ClientDriver), so tests run the
//! full request path against the in-process simulator.

pub mod config;
pub mod error;

pub use config::LedgerConfig;
pub use error::{AppError, Result};
