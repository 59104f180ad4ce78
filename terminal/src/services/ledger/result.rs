//! Routing tags and the owned results handed from the IO thread to the UI thread.

use shared::ledger::{CreateAccountResult, CreateTransferResult, WireError};
use thiserror::Error;

use super::ffi::PacketStatus;

/// Which reply parser a completion is routed to. Travels in `RequestSlot::user_tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum RoutingTag {
    QueryAccounts = 1,
    CreateAccount = 2,
    CreateTransfer = 3,
    GetAccountTransfers = 4,
    LookupAccounts = 5,
}

impl RoutingTag {
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            1 => Some(Self::QueryAccounts),
            2 => Some(Self::CreateAccount),
            3 => Some(Self::CreateTransfer),
            4 => Some(Self::GetAccountTransfers),
            5 => Some(Self::LookupAccounts),
            _ => None,
        }
    }

    pub fn raw(self) -> u16 {
        self as u16
    }
}

/// Request-level failures reported by the client or found while reading a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Ledger client rejected the request: {0:?}")]
    Rejected(PacketStatus),

    #[error("Reply carried unknown routing tag {0}")]
    UnknownResponse(u16),

    #[error("Malformed reply: {0}")]
    Malformed(#[from] WireError),

    #[error("Reply handler panicked")]
    HandlerPanicked,
}

/// Outcome of one completed request.
///
/// Query results carry only the number of records staged; the records
/// themselves wait in the staging buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    QueryAccounts { count: usize },
    LookupAccounts { count: usize },
    CreateAccount(Result<(), CreateAccountResult>),
    CreateTransfer(Result<(), CreateTransferResult>),
    GetAccountTransfers { count: usize },
    Failed { reason: TransportError },
}

impl OperationResult {
    pub fn failed(reason: TransportError) -> Self {
        Self::Failed { reason }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_tag_raw_values() {
        assert_eq!(RoutingTag::from_raw(RoutingTag::CreateTransfer.raw()), Some(RoutingTag::CreateTransfer));
        assert_eq!(RoutingTag::from_raw(0), None);
        assert_eq!(RoutingTag::from_raw(6), None);
    }

    #[test]
    fn test_transport_error_messages() {
        let err = TransportError::from(WireError::Misaligned { len: 5, record_size: 128 });
        assert_eq!(err.to_string(), "Malformed reply: 5 bytes is not a multiple of the 128-byte record size");
        assert!(OperationResult::failed(TransportError::UnknownResponse(9)).is_failure());
    }
}
