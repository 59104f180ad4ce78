use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::WireRecord;

/// Transfer flag bits.
pub struct TransferFlags;

impl TransferFlags {
    pub const LINKED: u16 = 1 << 0;
    pub const PENDING: u16 = 1 << 1;
    pub const POST_PENDING_TRANSFER: u16 = 1 << 2;
    pub const VOID_PENDING_TRANSFER: u16 = 1 << 3;
    pub const BALANCING_DEBIT: u16 = 1 << 4;
    pub const BALANCING_CREDIT: u16 = 1 << 5;
}

/// A double-entry transfer between two accounts on the same ledger (128 bytes on the wire).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Transfer {
    pub id: u128,
    pub debit_account_id: u128,
    pub credit_account_id: u128,
    pub amount: u128,
    pub pending_id: u128,
    pub user_data_128: u128,
    pub user_data_64: u64,
    pub user_data_32: u32,
    pub timeout: u32,
    pub ledger: u32,
    pub code: u16,
    pub flags: u16,
    pub timestamp: u64,
}

impl Transfer {
    /// A single-phase transfer ready to submit with `create_transfers`.
    pub fn new(
        id: u128,
        debit_account_id: u128,
        credit_account_id: u128,
        amount: u128,
        ledger: u32,
        code: u16,
    ) -> Self {
        Self {
            id,
            debit_account_id,
            credit_account_id,
            amount,
            ledger,
            code,
            ..Self::default()
        }
    }

    /// Whether `account_id` is on the debit side of this transfer.
    pub fn debits(&self, account_id: u128) -> bool {
        self.debit_account_id == account_id
    }
}

impl WireRecord for Transfer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_amount_offset() {
        let transfer = Transfer::new(1, 2, 3, 0x0A0B, 1, 1);
        let mut bytes = [0u8; Transfer::SIZE];
        transfer.write_to(&mut bytes);

        assert_eq!(bytes[16], 2);
        assert_eq!(bytes[32], 3);
        assert_eq!(&bytes[48..50], &[0x0B, 0x0A]);
        assert_eq!(Transfer::read_from(&bytes), transfer);
    }

    #[test]
    fn test_transfer_side() {
        let transfer = Transfer::new(1, 2, 3, 10, 1, 1);
        assert!(transfer.debits(2));
        assert!(!transfer.debits(3));
    }
}
