//! # Worker Bridge
//!
//! Everything the client's IO thread may touch, bundled behind one `Arc`.
//!
//! The completion callback runs on a thread the application does not own, at
//! a time it does not choose, with reply bytes that die when it returns. So it
//! only does four things: release the slot, copy the reply into owned staging
//! buffers, update the sequencer, and hand a small [`Delivery`] to the UI
//! through the mailbox and the dispatcher. It never touches `AppState`.
//!
//! Order within one completion: slot release, mailbox write, dispatch. A
//! completion for a sequence that was already retired only releases its slot.

use std::panic::{catch_unwind, AssertUnwindSafe};

use shared::ledger::{
    records, Account, CreateAccountResult, CreateResult, CreateTransferResult, Transfer, WireError,
    WireRecord,
};

use super::ffi::{PacketStatus, RequestSlot};
use super::mailbox::{Delivery, ResultMailbox};
use super::pool::RequestPool;
use super::result::{OperationResult, RoutingTag, TransportError};
use super::sequencer::Sequencer;
use super::staging::Staging;
use crate::app::dispatch::Dispatcher;
use crate::app::AppEvent;
use crate::core::config::LedgerConfig;

#[derive(Debug)]
pub struct WorkerBridge {
    pub pool: RequestPool,
    pub staging: Staging,
    pub mailbox: ResultMailbox,
    pub sequencer: Sequencer,
    dispatcher: Dispatcher,
}

/// Header fields copied out of a slot before it goes back to the pool.
#[derive(Debug, Clone, Copy)]
struct SlotHeader {
    sequence: u32,
    user_tag: u16,
    status: PacketStatus,
}

/// Releases the slot on every exit path of the completion.
struct ReleaseOnDrop<'a> {
    pool: &'a RequestPool,
    slot: *mut RequestSlot,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.pool.release(self.slot) {
            tracing::error!(error = %err, "Completion returned a slot the pool does not own");
        }
    }
}

impl WorkerBridge {
    pub fn new(config: &LedgerConfig, dispatcher: Dispatcher) -> Self {
        Self {
            pool: RequestPool::new(config.pool_capacity),
            staging: Staging::new(),
            mailbox: ResultMailbox::new(),
            sequencer: Sequencer::new(config.min_gap()),
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one completion. `slot` must be a slot from `self.pool` that the client just finished.
    fn complete(&self, slot: *mut RequestSlot, reply: &[u8]) {
        // SAFETY: the client hands the slot back exactly once; until it is
        // released below, this callback is its only user.
        let header = unsafe {
            let slot = &*slot;
            SlotHeader {
                sequence: slot.sequence(),
                user_tag: slot.user_tag,
                status: PacketStatus::from_raw(slot.status),
            }
        };
        let release = ReleaseOnDrop {
            pool: &self.pool,
            slot,
        };

        // Retired by the watchdog or a disconnect; its reply must not overwrite staging.
        // The callback still counts towards the settle gap.
        if self.sequencer.has_completed(header.sequence) {
            drop(release);
            self.sequencer.record_completion(header.sequence);
            tracing::debug!(sequence = header.sequence, "Late completion for a retired request - discarded");
            return;
        }

        let result = match header.status {
            PacketStatus::Ok => catch_unwind(AssertUnwindSafe(|| self.parse(header.user_tag, reply)))
                .unwrap_or_else(|_| OperationResult::failed(TransportError::HandlerPanicked)),
            status => OperationResult::failed(TransportError::Rejected(status)),
        };
        drop(release);

        tracing::debug!(
            sequence = header.sequence,
            status = ?header.status,
            reply_len = reply.len(),
            result = ?result,
            "Request completed"
        );

        self.sequencer.record_completion(header.sequence);
        self.mailbox.deposit(Delivery {
            sequence: header.sequence,
            result,
        });
        self.dispatcher.dispatch_to_main(AppEvent::Completion {
            sequence: header.sequence,
        });
    }

    fn parse(&self, user_tag: u16, reply: &[u8]) -> OperationResult {
        let Some(tag) = RoutingTag::from_raw(user_tag) else {
            tracing::warn!(user_tag, "Reply with unknown routing tag");
            return OperationResult::failed(TransportError::UnknownResponse(user_tag));
        };

        let parsed = match tag {
            RoutingTag::QueryAccounts => {
                self.stage_accounts(reply).map(|count| OperationResult::QueryAccounts { count })
            }
            RoutingTag::LookupAccounts => {
                self.stage_accounts(reply).map(|count| OperationResult::LookupAccounts { count })
            }
            RoutingTag::GetAccountTransfers => self
                .stage_transfers(reply)
                .map(|count| OperationResult::GetAccountTransfers { count }),
            RoutingTag::CreateAccount => first_rejection(reply).map(|code| {
                OperationResult::CreateAccount(match code {
                    None => Ok(()),
                    Some(code) => Err(CreateAccountResult::from_code(code)),
                })
            }),
            RoutingTag::CreateTransfer => first_rejection(reply).map(|code| {
                OperationResult::CreateTransfer(match code {
                    None => Ok(()),
                    Some(code) => Err(CreateTransferResult::from_code(code)),
                })
            }),
        };

        parsed.unwrap_or_else(|err| OperationResult::failed(TransportError::Malformed(err)))
    }

    fn stage_accounts(&self, reply: &[u8]) -> Result<usize, WireError> {
        let accounts = records::<Account>(reply)?;
        let mut staging = self.staging.accounts.lock();
        let staged = staging.fill(accounts);
        if reply.len() / Account::SIZE > staged {
            tracing::warn!(
                received = reply.len() / Account::SIZE,
                staged,
                "Account reply exceeds staging capacity - truncated"
            );
        }
        Ok(staged)
    }

    fn stage_transfers(&self, reply: &[u8]) -> Result<usize, WireError> {
        let transfers = records::<Transfer>(reply)?;
        let mut staging = self.staging.transfers.lock();
        let staged = staging.fill(transfers);
        if reply.len() / Transfer::SIZE > staged {
            tracing::warn!(
                received = reply.len() / Transfer::SIZE,
                staged,
                "Transfer reply exceeds staging capacity - truncated"
            );
        }
        Ok(staged)
    }
}

/// First rejection code in a create reply. An empty reply means every event succeeded.
fn first_rejection(reply: &[u8]) -> Result<Option<u32>, WireError> {
    Ok(records::<CreateResult>(reply)?
        .map(|r| r.result)
        .find(|&code| code != CreateAccountResult::Ok.code()))
}

/// The [`super::ffi::CompletionFn`] registered with the client.
///
/// `context` is `Arc::into_raw` of the [`WorkerBridge`], kept alive by the
/// connection handle until after the client is deinitialized. Panics never
/// cross into the foreign caller.
pub extern "C" fn on_completion(
    context: usize,
    slot: *mut RequestSlot,
    _timestamp: u64,
    result: *const u8,
    result_len: u32,
) {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        if context == 0 || slot.is_null() {
            tracing::error!(context, "Completion without context or slot - ignored");
            return;
        }
        // SAFETY: see the function docs; the handle outlives every callback.
        let bridge = unsafe { &*(context as *const WorkerBridge) };
        let reply = if result.is_null() || result_len == 0 {
            &[][..]
        } else {
            // SAFETY: the client guarantees `result_len` readable bytes for the duration of this call.
            unsafe { std::slice::from_raw_parts(result, result_len as usize) }
        };
        bridge.complete(slot, reply);
    }));

    if outcome.is_err() {
        tracing::error!("Panic in completion callback contained");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::dispatch::Dispatcher;
    use shared::ledger::{encode_records, LedgerOperation};

    fn bridge() -> (WorkerBridge, async_channel::Receiver<AppEvent>) {
        let (tx, rx) = async_channel::unbounded();
        let config = LedgerConfig::default();
        (WorkerBridge::new(&config, Dispatcher::new(tx)), rx)
    }

    fn submit(bridge: &WorkerBridge, tag: RoutingTag, sequence: u32) -> *mut RequestSlot {
        let mut guard = bridge.pool.acquire().unwrap();
        guard.set_request(LedgerOperation::QueryAccounts.code(), tag.raw(), sequence, 64);
        guard.into_raw()
    }

    fn deliver(bridge: &WorkerBridge, slot: *mut RequestSlot, reply: &[u8]) {
        on_completion(
            bridge as *const WorkerBridge as usize,
            slot,
            0,
            reply.as_ptr(),
            reply.len() as u32,
        );
    }

    #[tokio::test]
    async fn test_query_reply_is_staged_and_slot_released() {
        let (bridge, rx) = bridge();
        let seq = bridge.sequencer.next_sequence();
        let slot = submit(&bridge, RoutingTag::QueryAccounts, seq);

        let accounts = [Account::new(10, 1, 1), Account::new(11, 1, 1)];
        let mut reply = vec![0u8; 2 * Account::SIZE];
        encode_records(&accounts, &mut reply).unwrap();
        deliver(&bridge, slot, &reply);
        // reply memory dies with the callback
        reply.fill(0xAA);

        assert_eq!(bridge.pool.stats().in_use, 0);
        assert!(bridge.sequencer.has_completed(seq));
        assert_eq!(rx.try_recv().unwrap(), AppEvent::Completion { sequence: seq });

        let delivery = bridge.mailbox.take().unwrap();
        assert_eq!(delivery.result, OperationResult::QueryAccounts { count: 2 });
        let staged: Vec<u128> = bridge.staging.accounts.lock().as_slice().iter().map(|a| a.id).collect();
        assert_eq!(staged, vec![10, 11]);
    }

    #[tokio::test]
    async fn test_empty_query_reply() {
        let (bridge, _rx) = bridge();
        let slot = submit(&bridge, RoutingTag::QueryAccounts, 1);
        deliver(&bridge, slot, &[]);
        assert_eq!(
            bridge.mailbox.take().unwrap().result,
            OperationResult::QueryAccounts { count: 0 }
        );
    }

    #[tokio::test]
    async fn test_create_reply_reports_first_rejection() {
        let (bridge, _rx) = bridge();
        let slot = submit(&bridge, RoutingTag::CreateTransfer, 1);
        let rejected = [CreateResult {
            index: 0,
            result: CreateTransferResult::ExceedsCredits.code(),
        }];
        let mut reply = [0u8; CreateResult::SIZE];
        encode_records(&rejected, &mut reply).unwrap();
        deliver(&bridge, slot, &reply);

        assert_eq!(
            bridge.mailbox.take().unwrap().result,
            OperationResult::CreateTransfer(Err(CreateTransferResult::ExceedsCredits))
        );

        let slot = submit(&bridge, RoutingTag::CreateAccount, 2);
        deliver(&bridge, slot, &[]);
        assert_eq!(
            bridge.mailbox.take().unwrap().result,
            OperationResult::CreateAccount(Ok(()))
        );
    }

    #[tokio::test]
    async fn test_non_ok_status_becomes_transport_failure() {
        let (bridge, _rx) = bridge();
        let slot = submit(&bridge, RoutingTag::QueryAccounts, 1);
        unsafe { (*slot).status = PacketStatus::ClientShutdown.as_raw() };
        deliver(&bridge, slot, &[]);

        assert_eq!(
            bridge.mailbox.take().unwrap().result,
            OperationResult::failed(TransportError::Rejected(PacketStatus::ClientShutdown))
        );
        assert_eq!(bridge.pool.stats().in_use, 0);
    }

    #[tokio::test]
    async fn test_unknown_tag_and_malformed_reply_are_recoverable() {
        let (bridge, _rx) = bridge();
        let mut guard = bridge.pool.acquire().unwrap();
        guard.set_request(0, 99, 1, 0);
        deliver(&bridge, guard.into_raw(), &[]);
        assert_eq!(
            bridge.mailbox.take().unwrap().result,
            OperationResult::failed(TransportError::UnknownResponse(99))
        );

        let slot = submit(&bridge, RoutingTag::QueryAccounts, 2);
        deliver(&bridge, slot, &[0u8; 100]);
        assert!(matches!(
            bridge.mailbox.take().unwrap().result,
            OperationResult::Failed {
                reason: TransportError::Malformed(WireError::Misaligned { len: 100, .. })
            }
        ));
    }

    #[tokio::test]
    async fn test_late_completion_after_retire_is_discarded() {
        let (bridge, rx) = bridge();
        let seq = bridge.sequencer.next_sequence();
        let slot = submit(&bridge, RoutingTag::QueryAccounts, seq);
        bridge.sequencer.retire(seq);

        let mut reply = vec![0u8; Account::SIZE];
        encode_records(&[Account::new(3, 1, 1)], &mut reply).unwrap();
        deliver(&bridge, slot, &reply);

        assert_eq!(bridge.pool.stats().in_use, 0);
        assert!(bridge.mailbox.is_empty());
        assert!(bridge.staging.accounts.lock().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_late_completion_still_starts_settle_gap() {
        let (bridge, _rx) = bridge();
        let seq = bridge.sequencer.next_sequence();
        let slot = submit(&bridge, RoutingTag::QueryAccounts, seq);
        bridge.sequencer.retire(seq);
        assert!(!bridge.sequencer.should_rate_limit());

        deliver(&bridge, slot, &[]);

        assert!(bridge.sequencer.should_rate_limit());
        assert!(bridge.sequencer.remaining_gap() > std::time::Duration::ZERO);
        assert_eq!(bridge.sequencer.last_completed(), seq);
    }

    #[tokio::test]
    async fn test_null_slot_is_ignored() {
        let (bridge, rx) = bridge();
        deliver(&bridge, std::ptr::null_mut(), &[]);
        assert!(bridge.mailbox.is_empty());
        assert!(rx.try_recv().is_err());
    }
}
