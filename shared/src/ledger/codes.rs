use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::WireRecord;

/// Request types understood by the ledger cluster.
///
/// Codes below 128 are reserved for the replication protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LedgerOperation {
    CreateAccounts = 129,
    CreateTransfers = 130,
    LookupAccounts = 131,
    LookupTransfers = 132,
    GetAccountTransfers = 133,
    GetAccountBalances = 134,
    QueryAccounts = 135,
    QueryTransfers = 136,
}

impl LedgerOperation {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            129 => Some(Self::CreateAccounts),
            130 => Some(Self::CreateTransfers),
            131 => Some(Self::LookupAccounts),
            132 => Some(Self::LookupTransfers),
            133 => Some(Self::GetAccountTransfers),
            134 => Some(Self::GetAccountBalances),
            135 => Some(Self::QueryAccounts),
            136 => Some(Self::QueryTransfers),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::CreateAccounts => "create_accounts",
            Self::CreateTransfers => "create_transfers",
            Self::LookupAccounts => "lookup_accounts",
            Self::LookupTransfers => "lookup_transfers",
            Self::GetAccountTransfers => "get_account_transfers",
            Self::GetAccountBalances => "get_account_balances",
            Self::QueryAccounts => "query_accounts",
            Self::QueryTransfers => "query_transfers",
        }
    }
}

/// One rejected event in a `create_accounts` / `create_transfers` reply (8 bytes on the wire).
///
/// The ledger only reports failures; an empty reply means every event succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct CreateResult {
    /// Index of the rejected event within the request batch.
    pub index: u32,
    /// Raw result code, see [`CreateAccountResult`] / [`CreateTransferResult`].
    pub result: u32,
}

impl WireRecord for CreateResult {}

/// Why the ledger rejected an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum CreateAccountResult {
    Ok = 0,
    LinkedEventFailed = 1,
    LinkedEventChainOpen = 2,
    TimestampMustBeZero = 3,
    ReservedField = 4,
    ReservedFlag = 5,
    IdMustNotBeZero = 6,
    IdMustNotBeIntMax = 7,
    FlagsAreMutuallyExclusive = 8,
    DebitsPendingMustBeZero = 9,
    DebitsPostedMustBeZero = 10,
    CreditsPendingMustBeZero = 11,
    CreditsPostedMustBeZero = 12,
    LedgerMustNotBeZero = 13,
    CodeMustNotBeZero = 14,
    ExistsWithDifferentFlags = 15,
    ExistsWithDifferentUserData128 = 16,
    ExistsWithDifferentUserData64 = 17,
    ExistsWithDifferentUserData32 = 18,
    ExistsWithDifferentLedger = 19,
    ExistsWithDifferentCode = 20,
    Exists = 21,
    /// A code this client does not know about.
    Unrecognized = u32::MAX,
}

impl CreateAccountResult {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::LinkedEventFailed,
            2 => Self::LinkedEventChainOpen,
            3 => Self::TimestampMustBeZero,
            4 => Self::ReservedField,
            5 => Self::ReservedFlag,
            6 => Self::IdMustNotBeZero,
            7 => Self::IdMustNotBeIntMax,
            8 => Self::FlagsAreMutuallyExclusive,
            9 => Self::DebitsPendingMustBeZero,
            10 => Self::DebitsPostedMustBeZero,
            11 => Self::CreditsPendingMustBeZero,
            12 => Self::CreditsPostedMustBeZero,
            13 => Self::LedgerMustNotBeZero,
            14 => Self::CodeMustNotBeZero,
            15 => Self::ExistsWithDifferentFlags,
            16 => Self::ExistsWithDifferentUserData128,
            17 => Self::ExistsWithDifferentUserData64,
            18 => Self::ExistsWithDifferentUserData32,
            19 => Self::ExistsWithDifferentLedger,
            20 => Self::ExistsWithDifferentCode,
            21 => Self::Exists,
            _ => Self::Unrecognized,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// User-facing explanation.
    pub fn message(self) -> &'static str {
        match self {
            Self::Ok => "Account created",
            Self::LinkedEventFailed => "A linked account in the same batch failed",
            Self::LinkedEventChainOpen => "The linked account chain was left open",
            Self::TimestampMustBeZero => "Timestamp must be zero when creating an account",
            Self::ReservedField => "Reserved field must be zero",
            Self::ReservedFlag => "Reserved flag must not be set",
            Self::IdMustNotBeZero => "Account id must not be zero",
            Self::IdMustNotBeIntMax => "Account id must not be the maximum value",
            Self::FlagsAreMutuallyExclusive => "Balance constraint flags are mutually exclusive",
            Self::DebitsPendingMustBeZero => "Pending debits must be zero on a new account",
            Self::DebitsPostedMustBeZero => "Posted debits must be zero on a new account",
            Self::CreditsPendingMustBeZero => "Pending credits must be zero on a new account",
            Self::CreditsPostedMustBeZero => "Posted credits must be zero on a new account",
            Self::LedgerMustNotBeZero => "Ledger must not be zero",
            Self::CodeMustNotBeZero => "Account code must not be zero",
            Self::ExistsWithDifferentFlags => "Account exists with different flags",
            Self::ExistsWithDifferentUserData128 => "Account exists with different user data (128)",
            Self::ExistsWithDifferentUserData64 => "Account exists with different user data (64)",
            Self::ExistsWithDifferentUserData32 => "Account exists with different user data (32)",
            Self::ExistsWithDifferentLedger => "Account exists on a different ledger",
            Self::ExistsWithDifferentCode => "Account exists with a different code",
            Self::Exists => "Account already exists",
            Self::Unrecognized => "Ledger rejected the account",
        }
    }
}

/// Why the ledger rejected a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum CreateTransferResult {
    Ok = 0,
    LinkedEventFailed = 1,
    LinkedEventChainOpen = 2,
    TimestampMustBeZero = 3,
    ReservedFlag = 4,
    IdMustNotBeZero = 5,
    IdMustNotBeIntMax = 6,
    FlagsAreMutuallyExclusive = 7,
    DebitAccountIdMustNotBeZero = 8,
    DebitAccountIdMustNotBeIntMax = 9,
    CreditAccountIdMustNotBeZero = 10,
    CreditAccountIdMustNotBeIntMax = 11,
    AccountsMustBeDifferent = 12,
    PendingIdMustBeZero = 13,
    LedgerMustNotBeZero = 14,
    CodeMustNotBeZero = 15,
    DebitAccountNotFound = 16,
    CreditAccountNotFound = 17,
    AccountsMustHaveTheSameLedger = 18,
    TransferMustHaveTheSameLedgerAsAccounts = 19,
    Exists = 20,
    ExceedsCredits = 21,
    ExceedsDebits = 22,
    DebitAccountAlreadyClosed = 23,
    CreditAccountAlreadyClosed = 24,
    Unrecognized = u32::MAX,
}

impl CreateTransferResult {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::LinkedEventFailed,
            2 => Self::LinkedEventChainOpen,
            3 => Self::TimestampMustBeZero,
            4 => Self::ReservedFlag,
            5 => Self::IdMustNotBeZero,
            6 => Self::IdMustNotBeIntMax,
            7 => Self::FlagsAreMutuallyExclusive,
            8 => Self::DebitAccountIdMustNotBeZero,
            9 => Self::DebitAccountIdMustNotBeIntMax,
            10 => Self::CreditAccountIdMustNotBeZero,
            11 => Self::CreditAccountIdMustNotBeIntMax,
            12 => Self::AccountsMustBeDifferent,
            13 => Self::PendingIdMustBeZero,
            14 => Self::LedgerMustNotBeZero,
            15 => Self::CodeMustNotBeZero,
            16 => Self::DebitAccountNotFound,
            17 => Self::CreditAccountNotFound,
            18 => Self::AccountsMustHaveTheSameLedger,
            19 => Self::TransferMustHaveTheSameLedgerAsAccounts,
            20 => Self::Exists,
            21 => Self::ExceedsCredits,
            22 => Self::ExceedsDebits,
            23 => Self::DebitAccountAlreadyClosed,
            24 => Self::CreditAccountAlreadyClosed,
            _ => Self::Unrecognized,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// User-facing explanation.
    pub fn message(self) -> &'static str {
        match self {
            Self::Ok => "Transfer created",
            Self::LinkedEventFailed => "A linked transfer in the same batch failed",
            Self::LinkedEventChainOpen => "The linked transfer chain was left open",
            Self::TimestampMustBeZero => "Timestamp must be zero when creating a transfer",
            Self::ReservedFlag => "Reserved flag must not be set",
            Self::IdMustNotBeZero => "Transfer id must not be zero",
            Self::IdMustNotBeIntMax => "Transfer id must not be the maximum value",
            Self::FlagsAreMutuallyExclusive => "Transfer flags are mutually exclusive",
            Self::DebitAccountIdMustNotBeZero => "Debit account must be selected",
            Self::DebitAccountIdMustNotBeIntMax => "Debit account id is invalid",
            Self::CreditAccountIdMustNotBeZero => "Credit account must be selected",
            Self::CreditAccountIdMustNotBeIntMax => "Credit account id is invalid",
            Self::AccountsMustBeDifferent => "Debit and credit accounts must be different",
            Self::PendingIdMustBeZero => "Pending id must be zero for a single-phase transfer",
            Self::LedgerMustNotBeZero => "Ledger must not be zero",
            Self::CodeMustNotBeZero => "Transfer code must not be zero",
            Self::DebitAccountNotFound => "Debit account not found",
            Self::CreditAccountNotFound => "Credit account not found",
            Self::AccountsMustHaveTheSameLedger => "Accounts must be on the same ledger",
            Self::TransferMustHaveTheSameLedgerAsAccounts => "Transfer ledger must match the accounts",
            Self::Exists => "Transfer already exists",
            Self::ExceedsCredits => "Transfer exceeds the credit account's balance limit",
            Self::ExceedsDebits => "Transfer exceeds the debit account's balance limit",
            Self::DebitAccountAlreadyClosed => "Debit account is closed",
            Self::CreditAccountAlreadyClosed => "Credit account is closed",
            Self::Unrecognized => "Ledger rejected the transfer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_codes_round_trip_known_values() {
        for op in [
            LedgerOperation::CreateAccounts,
            LedgerOperation::CreateTransfers,
            LedgerOperation::GetAccountTransfers,
            LedgerOperation::QueryAccounts,
        ] {
            assert_eq!(LedgerOperation::from_code(op.code()), Some(op));
        }
        assert_eq!(LedgerOperation::from_code(0), None);
        assert_eq!(LedgerOperation::from_code(200), None);
    }

    #[test]
    fn test_unknown_result_codes_are_unrecognized() {
        assert_eq!(CreateAccountResult::from_code(9999), CreateAccountResult::Unrecognized);
        assert_eq!(CreateTransferResult::from_code(77), CreateTransferResult::Unrecognized);
        assert_eq!(CreateAccountResult::from_code(21), CreateAccountResult::Exists);
        assert_eq!(CreateTransferResult::Exists.code(), 20);
    }

    #[test]
    fn test_create_result_layout() {
        let result = CreateResult { index: 3, result: CreateTransferResult::ExceedsCredits.code() };
        let mut bytes = [0u8; CreateResult::SIZE];
        result.write_to(&mut bytes);
        assert_eq!(bytes, [3, 0, 0, 0, 21, 0, 0, 0]);
        assert_eq!(CreateResult::read_from(&bytes), result);
    }
}
