use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::WireRecord;

/// `QueryFilter` flag bits.
pub struct QueryFilterFlags;

impl QueryFilterFlags {
    pub const REVERSED: u32 = 1 << 0;
}

/// `AccountFilter` flag bits.
pub struct AccountFilterFlags;

impl AccountFilterFlags {
    pub const DEBITS: u32 = 1 << 0;
    pub const CREDITS: u32 = 1 << 1;
    pub const REVERSED: u32 = 1 << 2;
}

/// Payload for `query_accounts` / `query_transfers` (64 bytes on the wire).
///
/// Zero-valued fields are wildcards. `timestamp_max == 0` means "no upper bound".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct QueryFilter {
    pub user_data_128: u128,
    pub user_data_64: u64,
    pub user_data_32: u32,
    pub ledger: u32,
    pub code: u16,
    pub reserved: [u8; 6],
    pub timestamp_min: u64,
    pub timestamp_max: u64,
    pub limit: u32,
    pub flags: u32,
}

impl QueryFilter {
    /// Every account on `ledger`, oldest first, up to `limit`.
    pub fn for_ledger(ledger: u32, limit: u32) -> Self {
        Self {
            ledger,
            limit,
            ..Self::default()
        }
    }
}

impl WireRecord for QueryFilter {}

/// Payload for `get_account_transfers` / `get_account_balances` (128 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct AccountFilter {
    pub account_id: u128,
    pub user_data_128: u128,
    pub user_data_64: u64,
    pub user_data_32: u32,
    pub code: u16,
    pub reserved: [u8; 58],
    pub timestamp_min: u64,
    pub timestamp_max: u64,
    pub limit: u32,
    pub flags: u32,
}

impl Default for AccountFilter {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl AccountFilter {
    /// Both debit and credit transfers touching `account_id`, oldest first.
    pub fn for_account(account_id: u128, limit: u32) -> Self {
        Self {
            account_id,
            limit,
            flags: AccountFilterFlags::DEBITS | AccountFilterFlags::CREDITS,
            ..Self::default()
        }
    }

    pub fn includes_debits(&self) -> bool {
        self.flags & AccountFilterFlags::DEBITS != 0
    }

    pub fn includes_credits(&self) -> bool {
        self.flags & AccountFilterFlags::CREDITS != 0
    }
}

impl WireRecord for AccountFilter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_filter_tail_fields() {
        let mut filter = QueryFilter::for_ledger(1, 128);
        filter.flags = QueryFilterFlags::REVERSED;
        let mut bytes = [0u8; QueryFilter::SIZE];
        filter.write_to(&mut bytes);

        assert_eq!(bytes[28], 1);
        assert_eq!(&bytes[56..60], &128u32.to_le_bytes());
        assert_eq!(&bytes[60..64], &1u32.to_le_bytes());
        assert_eq!(QueryFilter::read_from(&bytes), filter);
    }

    #[test]
    fn test_account_filter_defaults_to_both_sides() {
        let filter = AccountFilter::for_account(42, 10);
        assert!(filter.includes_debits());
        assert!(filter.includes_credits());

        let mut bytes = [0u8; AccountFilter::SIZE];
        filter.write_to(&mut bytes);
        assert_eq!(bytes[0], 42);
        assert_eq!(&bytes[120..124], &10u32.to_le_bytes());
        assert_eq!(AccountFilter::read_from(&bytes), filter);
    }
}
