//! # Event Handlers
//!
//! User action handlers organized by domain.

pub mod connection;
pub mod ledger;
