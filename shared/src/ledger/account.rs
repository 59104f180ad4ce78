use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::WireRecord;

/// Account flag bits.
pub struct AccountFlags;

impl AccountFlags {
    pub const LINKED: u16 = 1 << 0;
    pub const DEBITS_MUST_NOT_EXCEED_CREDITS: u16 = 1 << 1;
    pub const CREDITS_MUST_NOT_EXCEED_DEBITS: u16 = 1 << 2;
    pub const HISTORY: u16 = 1 << 3;
    pub const IMPORTED: u16 = 1 << 4;
    pub const CLOSED: u16 = 1 << 5;
}

/// A ledger account (128 bytes on the wire).
///
/// Balances are unsigned minor units. `timestamp` is assigned by the cluster
/// (nanoseconds since the Unix epoch) and must be zero on creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Account {
    pub id: u128,
    pub debits_pending: u128,
    pub debits_posted: u128,
    pub credits_pending: u128,
    pub credits_posted: u128,
    pub user_data_128: u128,
    pub user_data_64: u64,
    pub user_data_32: u32,
    pub reserved: u32,
    pub ledger: u32,
    pub code: u16,
    pub flags: u16,
    pub timestamp: u64,
}

impl Account {
    /// A fresh account ready to submit with `create_accounts`.
    pub fn new(id: u128, ledger: u32, code: u16) -> Self {
        Self {
            id,
            ledger,
            code,
            ..Self::default()
        }
    }

    /// Posted credits minus posted debits, saturating at the `i128` range.
    pub fn net_balance(&self) -> i128 {
        let credits = i128::try_from(self.credits_posted).unwrap_or(i128::MAX);
        let debits = i128::try_from(self.debits_posted).unwrap_or(i128::MAX);
        credits.saturating_sub(debits)
    }

    pub fn has_flag(&self, flag: u16) -> bool {
        self.flags & flag != 0
    }
}

impl WireRecord for Account {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_layout_offsets() {
        let mut account = Account::new(0x0102, 7, 3);
        account.credits_posted = 500;
        account.flags = AccountFlags::HISTORY;
        account.timestamp = 0xAABB;

        let mut bytes = [0u8; Account::SIZE];
        account.write_to(&mut bytes);

        assert_eq!(&bytes[0..2], &[0x02, 0x01]);
        // credits_posted sits after id + three balance fields
        assert_eq!(bytes[64], 0xF4);
        assert_eq!(bytes[65], 0x01);
        // ledger at 112, code at 116, flags at 118, timestamp at 120
        assert_eq!(bytes[112], 7);
        assert_eq!(bytes[116], 3);
        assert_eq!(bytes[118], AccountFlags::HISTORY as u8);
        assert_eq!(&bytes[120..122], &[0xBB, 0xAA]);
    }

    #[test]
    fn test_account_decode_matches_encode() {
        let mut account = Account::new(u128::MAX - 1, 1, 10);
        account.debits_posted = 12;
        account.user_data_64 = 99;

        let mut bytes = [0u8; Account::SIZE];
        account.write_to(&mut bytes);
        assert_eq!(Account::read_from(&bytes), account);
    }

    #[test]
    fn test_net_balance() {
        let mut account = Account::new(1, 1, 1);
        account.credits_posted = 300;
        account.debits_posted = 450;
        assert_eq!(account.net_balance(), -150);

        account.credits_posted = u128::MAX;
        account.debits_posted = 0;
        assert_eq!(account.net_balance(), i128::MAX);
    }
}
