//! # Client Binding
//!
//! Safe wrapper over one [`ClientDriver`] session.
//!
//! The driver keeps the address of the client handle it initialized, so the
//! handle lives in pinned heap storage and is written in place. The bridge
//! context handed to the driver is an `Arc` leaked with `Arc::into_raw` and
//! reclaimed only after `deinit` has returned, when no completion can fire.

use std::cell::UnsafeCell;
use std::marker::PhantomPinned;
use std::mem::MaybeUninit;
use std::pin::Pin;
use std::sync::Arc;

use shared::ledger::{
    encode_records, Account, AccountFilter, LedgerOperation, QueryFilter, Transfer, WireError,
    WireRecord,
};
use thiserror::Error;

use super::bridge::{on_completion, WorkerBridge};
use super::ffi::{ClientDriver, ClientStatus, InitStatus, RawClient, SLOT_PAYLOAD_BYTES};
use super::result::RoutingTag;

/// Why the client could not be initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Invalid ledger address")]
    InvalidAddress,

    #[error("Network unavailable")]
    NetworkUnavailable,

    #[error("Out of system resources")]
    ResourceExhaustion,

    #[error("Unexpected client error")]
    Unknown,
}

impl From<InitStatus> for ConnectError {
    fn from(status: InitStatus) -> Self {
        match status {
            InitStatus::AddressInvalid | InitStatus::AddressLimitExceeded => Self::InvalidAddress,
            InitStatus::NetworkSubsystem => Self::NetworkUnavailable,
            InitStatus::OutOfMemory | InitStatus::SystemResources => Self::ResourceExhaustion,
            InitStatus::Success | InitStatus::Unexpected | InitStatus::Unknown(_) => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Every request slot is in flight. Backpressure, not a failure.
    #[error("No free request slot")]
    PoolExhausted,

    #[error("Request of {len} bytes exceeds the {max}-byte payload")]
    PayloadTooLarge { len: usize, max: usize },

    /// The client refused the request.
    #[error("Client rejected the request")]
    Invalid,

    #[error("Could not encode request: {0}")]
    Encode(WireError),
}

/// Address-stable storage for the client handle.
pub struct ClientStorage {
    raw: UnsafeCell<MaybeUninit<RawClient>>,
    _pin: PhantomPinned,
}

impl ClientStorage {
    pub fn new() -> Pin<Box<Self>> {
        Box::pin(Self {
            raw: UnsafeCell::new(MaybeUninit::uninit()),
            _pin: PhantomPinned,
        })
    }

    /// Initialize the client in place. The storage must not be touched by
    /// anything but `driver` until it is deinitialized.
    pub fn init_in_place(
        self: Pin<&mut Self>,
        driver: &dyn ClientDriver,
        cluster_id: u128,
        address: &str,
        context: usize,
    ) -> Result<(), ConnectError> {
        let handle = self.as_ptr();
        // SAFETY: `self` is pinned, so `handle` stays valid and in place until
        // the storage is dropped, which `ConnectionHandle` orders after deinit.
        let status = unsafe { driver.init(handle, cluster_id, address, context, on_completion) };
        match status {
            InitStatus::Success => Ok(()),
            status => Err(ConnectError::from(status)),
        }
    }

    pub fn as_ptr(&self) -> *mut RawClient {
        self.raw.get().cast()
    }
}

/// An initialized client session.
///
/// Dropping the handle deinitializes the client, which completes any pending
/// requests with `ClientShutdown` before returning.
pub struct ConnectionHandle {
    storage: Pin<Box<ClientStorage>>,
    driver: Arc<dyn ClientDriver>,
    bridge: Arc<WorkerBridge>,
    context: usize,
}

impl ConnectionHandle {
    pub fn open(
        driver: Arc<dyn ClientDriver>,
        bridge: Arc<WorkerBridge>,
        cluster_id: u128,
        address: &str,
    ) -> Result<Self, ConnectError> {
        let mut storage = ClientStorage::new();
        let context = Arc::into_raw(Arc::clone(&bridge)) as usize;

        if let Err(err) = storage
            .as_mut()
            .init_in_place(driver.as_ref(), cluster_id, address, context)
        {
            // SAFETY: init failed, so the driver kept no copy of `context`.
            drop(unsafe { Arc::from_raw(context as *const WorkerBridge) });
            tracing::warn!(driver = driver.name(), address, error = %err, "Client init failed");
            return Err(err);
        }

        tracing::info!(driver = driver.name(), address, cluster_id, "Client initialized");
        Ok(Self {
            storage,
            driver,
            bridge,
            context,
        })
    }

    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    pub fn query_accounts(&self, sequence: u32, filter: &QueryFilter) -> Result<(), SubmitError> {
        self.submit(
            LedgerOperation::QueryAccounts,
            RoutingTag::QueryAccounts,
            sequence,
            std::slice::from_ref(filter),
        )
    }

    pub fn lookup_accounts(&self, sequence: u32, ids: &[u128]) -> Result<(), SubmitError> {
        self.submit(
            LedgerOperation::LookupAccounts,
            RoutingTag::LookupAccounts,
            sequence,
            ids,
        )
    }

    pub fn create_accounts(&self, sequence: u32, accounts: &[Account]) -> Result<(), SubmitError> {
        self.submit(
            LedgerOperation::CreateAccounts,
            RoutingTag::CreateAccount,
            sequence,
            accounts,
        )
    }

    pub fn create_transfers(&self, sequence: u32, transfers: &[Transfer]) -> Result<(), SubmitError> {
        self.submit(
            LedgerOperation::CreateTransfers,
            RoutingTag::CreateTransfer,
            sequence,
            transfers,
        )
    }

    pub fn get_account_transfers(
        &self,
        sequence: u32,
        filter: &AccountFilter,
    ) -> Result<(), SubmitError> {
        self.submit(
            LedgerOperation::GetAccountTransfers,
            RoutingTag::GetAccountTransfers,
            sequence,
            std::slice::from_ref(filter),
        )
    }

    fn submit<T: WireRecord>(
        &self,
        operation: LedgerOperation,
        tag: RoutingTag,
        sequence: u32,
        records: &[T],
    ) -> Result<(), SubmitError> {
        let len = records.len() * T::SIZE;
        if len > SLOT_PAYLOAD_BYTES {
            return Err(SubmitError::PayloadTooLarge {
                len,
                max: SLOT_PAYLOAD_BYTES,
            });
        }

        let mut slot = self.bridge.pool.acquire().ok_or(SubmitError::PoolExhausted)?;
        let written = encode_records(records, slot.payload_mut()).map_err(SubmitError::Encode)?;
        slot.set_request(operation.code(), tag.raw(), sequence, written);
        let index = slot.index();
        let raw = slot.into_raw();

        // SAFETY: the handle is initialized for as long as `self` lives, and
        // `raw` is a pool slot whose ownership passes to the client on Ok.
        let status = unsafe { self.driver.submit(self.storage.as_ptr(), raw) };
        match status {
            ClientStatus::Ok => {
                tracing::debug!(operation = operation.name(), sequence, slot = index, "Request submitted");
                Ok(())
            }
            ClientStatus::Invalid => {
                if let Err(err) = self.bridge.pool.release(raw) {
                    tracing::error!(error = %err, "Could not reclaim rejected slot");
                }
                tracing::warn!(operation = operation.name(), sequence, "Client rejected request");
                Err(SubmitError::Invalid)
            }
        }
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        // SAFETY: initialized in `open`; nothing submits after this point.
        unsafe { self.driver.deinit(self.storage.as_ptr()) };
        // SAFETY: deinit has returned, so the driver holds no copy of the context.
        drop(unsafe { Arc::from_raw(self.context as *const WorkerBridge) });
        tracing::info!(driver = self.driver.name(), "Client deinitialized");
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("driver", &self.driver.name())
            .field("handle", &self.storage.as_ptr())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::dispatch::Dispatcher;
    use crate::app::AppEvent;
    use crate::core::config::LedgerConfig;
    use crate::services::ledger::simulator::{SimulatedLedger, SimulatorOptions};
    use crate::services::ledger::OperationResult;
    use std::time::Duration;

    fn bridge() -> (Arc<WorkerBridge>, async_channel::Receiver<AppEvent>) {
        let (tx, rx) = async_channel::unbounded();
        let bridge = WorkerBridge::new(&LedgerConfig::default(), Dispatcher::new(tx));
        (Arc::new(bridge), rx)
    }

    #[test]
    fn test_init_status_mapping() {
        assert_eq!(ConnectError::from(InitStatus::AddressInvalid), ConnectError::InvalidAddress);
        assert_eq!(
            ConnectError::from(InitStatus::AddressLimitExceeded),
            ConnectError::InvalidAddress
        );
        assert_eq!(
            ConnectError::from(InitStatus::NetworkSubsystem),
            ConnectError::NetworkUnavailable
        );
        assert_eq!(ConnectError::from(InitStatus::OutOfMemory), ConnectError::ResourceExhaustion);
        assert_eq!(
            ConnectError::from(InitStatus::SystemResources),
            ConnectError::ResourceExhaustion
        );
        assert_eq!(ConnectError::from(InitStatus::Unknown(77)), ConnectError::Unknown);
    }

    #[tokio::test]
    async fn test_failed_open_releases_context() {
        let (bridge, _rx) = bridge();
        let driver = Arc::new(SimulatedLedger::new());
        let err = ConnectionHandle::open(driver, Arc::clone(&bridge), 0, "nope").unwrap_err();
        assert_eq!(err, ConnectError::InvalidAddress);
        assert_eq!(Arc::strong_count(&bridge), 1);
    }

    #[tokio::test]
    async fn test_query_round_trip() {
        let (bridge, rx) = bridge();
        let driver = Arc::new(SimulatedLedger::new());
        driver.book().lock().create_account(&Account::new(5, 1, 1));

        let handle = ConnectionHandle::open(driver.clone(), Arc::clone(&bridge), 0, "3000").unwrap();
        assert_eq!(Arc::strong_count(&bridge), 2);

        let seq = bridge.sequencer.next_sequence();
        handle.query_accounts(seq, &QueryFilter::for_ledger(1, 10)).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(event, AppEvent::Completion { sequence: seq });
        let delivery = bridge.mailbox.take().unwrap();
        assert_eq!(delivery.result, OperationResult::QueryAccounts { count: 1 });
        assert_eq!(bridge.staging.accounts.lock().as_slice()[0].id, 5);
        assert_eq!(bridge.pool.stats().in_use, 0);

        drop(handle);
        assert!(!driver.is_running());
        assert_eq!(Arc::strong_count(&bridge), 1);
    }

    #[tokio::test]
    async fn test_batch_beyond_payload_is_refused() {
        let (bridge, _rx) = bridge();
        let handle =
            ConnectionHandle::open(Arc::new(SimulatedLedger::new()), Arc::clone(&bridge), 0, "3000").unwrap();
        let accounts = [Account::new(1, 1, 1), Account::new(2, 1, 1)];
        assert_eq!(
            handle.create_accounts(1, &accounts),
            Err(SubmitError::PayloadTooLarge { len: 256, max: 128 })
        );
        assert_eq!(bridge.pool.stats().in_use, 0);
    }

    #[tokio::test]
    async fn test_exhausted_pool_is_backpressure() {
        let (bridge, _rx) = bridge();
        let driver = Arc::new(SimulatedLedger::new());
        driver.set_stalled(true);
        let handle = ConnectionHandle::open(driver.clone(), Arc::clone(&bridge), 0, "3000").unwrap();

        let filter = QueryFilter::for_ledger(1, 10);
        for _ in 0..bridge.pool.capacity() {
            let seq = bridge.sequencer.next_sequence();
            handle.query_accounts(seq, &filter).unwrap();
        }
        assert_eq!(handle.query_accounts(99, &filter), Err(SubmitError::PoolExhausted));

        // deinit completes the held requests and returns every slot
        drop(handle);
        assert_eq!(bridge.pool.stats().in_use, 0);
    }

    #[tokio::test]
    async fn test_open_with_failing_driver() {
        let (bridge, _rx) = bridge();
        let driver = Arc::new(SimulatedLedger::with_options(SimulatorOptions {
            init_failure: Some(InitStatus::SystemResources),
            ..SimulatorOptions::default()
        }));
        let err = ConnectionHandle::open(driver, bridge, 0, "3000").unwrap_err();
        assert_eq!(err, ConnectError::ResourceExhaustion);
    }
}
