//! # Services Module
//!
//! External integrations. The only one is the ledger cluster, reached through
//! the native client library (or its in-process simulator).

pub mod ledger;
