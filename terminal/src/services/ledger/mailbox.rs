//! Single-slot handoff of [`OperationResult`]s from the IO thread to the UI thread.
//!
//! At most one request is in flight, so one slot is enough. A deposit that
//! displaces an unread result is logged; the displaced result is stale.

use parking_lot::Mutex;

use super::result::OperationResult;

/// A result tagged with the sequence of the submission that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub sequence: u32,
    pub result: OperationResult,
}

#[derive(Debug, Default)]
pub struct ResultMailbox {
    slot: Mutex<Option<Delivery>>,
}

impl ResultMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `delivery`, returning whatever was still waiting.
    pub fn deposit(&self, delivery: Delivery) -> Option<Delivery> {
        let displaced = self.slot.lock().replace(delivery);
        if let Some(old) = &displaced {
            tracing::warn!(sequence = old.sequence, "Unread result displaced from mailbox");
        }
        displaced
    }

    pub fn take(&self) -> Option<Delivery> {
        self.slot.lock().take()
    }

    pub fn clear(&self) {
        self.slot.lock().take();
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_empties_mailbox() {
        let mailbox = ResultMailbox::new();
        assert!(mailbox.take().is_none());

        mailbox.deposit(Delivery {
            sequence: 1,
            result: OperationResult::QueryAccounts { count: 0 },
        });
        assert!(!mailbox.is_empty());
        assert_eq!(mailbox.take().map(|d| d.sequence), Some(1));
        assert!(mailbox.is_empty());
    }

    #[test]
    fn test_deposit_returns_displaced() {
        let mailbox = ResultMailbox::new();
        mailbox.deposit(Delivery {
            sequence: 1,
            result: OperationResult::CreateAccount(Ok(())),
        });
        let displaced = mailbox.deposit(Delivery {
            sequence: 2,
            result: OperationResult::CreateAccount(Ok(())),
        });
        assert_eq!(displaced.map(|d| d.sequence), Some(1));
        assert_eq!(mailbox.take().map(|d| d.sequence), Some(2));
    }
}
