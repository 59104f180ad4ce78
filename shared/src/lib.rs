//! # Shared Ledger Types Library
//!
//! This library defines the contract between the ledger terminal and the ledger
//! cluster: the fixed-size binary records the native client sends and receives,
//! the operation codes that select a request type, and the result codes the
//! ledger returns for rejected events.
//!
//! ## Structure
//!
//! - **[`ledger`]**: Wire records and codes
//!   - **[`ledger::Account`]** / **[`ledger::Transfer`]**: 128-byte ledger records
//!   - **[`ledger::QueryFilter`]** / **[`ledger::AccountFilter`]**: query payloads
//!   - **[`ledger::LedgerOperation`]**: operation codes understood by the cluster
//!   - **[`ledger::CreateAccountResult`]** / **[`ledger::CreateTransferResult`]**: per-event rejections
//! - **[`utils`]**: Display helpers
//!   - **[`utils::format_amount`]** / **[`utils::parse_amount`]**: minor-unit money text
//!   - **[`utils::short_id`]**: abbreviated identifiers for tables
//!
//! ## Wire Format
//!
//! All records are little-endian and packed exactly as the ledger lays them
//! out in memory. Multi-record payloads are simple concatenations, so a
//! response of `n` accounts is exactly `n * 128` bytes:
//!
//! ```rust
//! use shared::ledger::{records, Account, WireRecord};
//!
//! let account = Account::new(7, 1, 10);
//! let mut bytes = [0u8; Account::SIZE];
//! account.write_to(&mut bytes);
//!
//! let decoded: Vec<Account> = records(&bytes).unwrap().collect();
//! assert_eq!(decoded, vec![account]);
//! ```

pub mod ledger;
pub mod utils;

// Re-export commonly used types for convenience
pub use ledger::*;
pub use utils::*;
