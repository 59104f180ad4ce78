//! # Simulated Ledger
//!
//! In-process [`ClientDriver`] that behaves like the native client from the
//! caller's point of view:
//!
//! - requests are queued and executed on a dedicated IO thread
//! - completions fire on that thread, never on the submitter's
//! - reply bytes are only valid during the callback (the buffer is scribbled
//!   over as soon as the callback returns)
//! - the handle records its own address at init and rejects submissions made
//!   through a moved copy
//! - `deinit` completes anything still pending with `ClientShutdown`
//!
//! Accounts and transfers live in a [`LedgerBook`] that outlives individual
//! sessions, so reconnecting shows the same data.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use async_channel::{Receiver, Sender};
use parking_lot::Mutex;
use shared::ledger::{
    encode_records, records, Account, AccountFilter, AccountFlags, CreateAccountResult, CreateResult,
    CreateTransferResult, LedgerOperation, QueryFilter, QueryFilterFlags, AccountFilterFlags, Transfer,
    WireRecord,
};

use super::ffi::{ClientDriver, ClientStatus, CompletionFn, InitStatus, PacketStatus, RawClient, RequestSlot};

/// Most addresses a client may be given (one per replica).
const MAX_ADDRESSES: usize = 6;

/// Byte written over reply buffers once the callback has returned.
const POISON: u8 = 0xA5;

/// Accounts and transfers held by the simulated cluster.
#[derive(Debug, Default)]
pub struct LedgerBook {
    accounts: BTreeMap<u128, Account>,
    transfers: Vec<Transfer>,
    transfer_index: HashMap<u128, usize>,
    last_timestamp: u64,
}

impl LedgerBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, id: u128) -> Option<&Account> {
        self.accounts.get(&id)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    /// Cluster time: wall-clock nanoseconds, strictly increasing.
    fn tick(&mut self) -> u64 {
        let now = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0).max(0) as u64;
        self.last_timestamp = now.max(self.last_timestamp + 1);
        self.last_timestamp
    }

    pub fn create_account(&mut self, account: &Account) -> CreateAccountResult {
        use CreateAccountResult as R;

        if account.timestamp != 0 {
            return R::TimestampMustBeZero;
        }
        if account.reserved != 0 {
            return R::ReservedField;
        }
        if account.flags & !0x3F != 0 {
            return R::ReservedFlag;
        }
        if account.id == 0 {
            return R::IdMustNotBeZero;
        }
        if account.id == u128::MAX {
            return R::IdMustNotBeIntMax;
        }
        if account.has_flag(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS)
            && account.has_flag(AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS)
        {
            return R::FlagsAreMutuallyExclusive;
        }
        if account.debits_pending != 0 {
            return R::DebitsPendingMustBeZero;
        }
        if account.debits_posted != 0 {
            return R::DebitsPostedMustBeZero;
        }
        if account.credits_pending != 0 {
            return R::CreditsPendingMustBeZero;
        }
        if account.credits_posted != 0 {
            return R::CreditsPostedMustBeZero;
        }
        if account.ledger == 0 {
            return R::LedgerMustNotBeZero;
        }
        if account.code == 0 {
            return R::CodeMustNotBeZero;
        }

        if let Some(existing) = self.accounts.get(&account.id) {
            return if existing.flags != account.flags {
                R::ExistsWithDifferentFlags
            } else if existing.user_data_128 != account.user_data_128 {
                R::ExistsWithDifferentUserData128
            } else if existing.user_data_64 != account.user_data_64 {
                R::ExistsWithDifferentUserData64
            } else if existing.user_data_32 != account.user_data_32 {
                R::ExistsWithDifferentUserData32
            } else if existing.ledger != account.ledger {
                R::ExistsWithDifferentLedger
            } else if existing.code != account.code {
                R::ExistsWithDifferentCode
            } else {
                R::Exists
            };
        }

        let mut stored = *account;
        stored.timestamp = self.tick();
        self.accounts.insert(stored.id, stored);
        R::Ok
    }

    pub fn create_transfer(&mut self, transfer: &Transfer) -> CreateTransferResult {
        use CreateTransferResult as R;

        if transfer.timestamp != 0 {
            return R::TimestampMustBeZero;
        }
        if transfer.flags != 0 {
            // only single-phase transfers are simulated
            return R::ReservedFlag;
        }
        if transfer.id == 0 {
            return R::IdMustNotBeZero;
        }
        if transfer.id == u128::MAX {
            return R::IdMustNotBeIntMax;
        }
        if transfer.debit_account_id == 0 {
            return R::DebitAccountIdMustNotBeZero;
        }
        if transfer.debit_account_id == u128::MAX {
            return R::DebitAccountIdMustNotBeIntMax;
        }
        if transfer.credit_account_id == 0 {
            return R::CreditAccountIdMustNotBeZero;
        }
        if transfer.credit_account_id == u128::MAX {
            return R::CreditAccountIdMustNotBeIntMax;
        }
        if transfer.debit_account_id == transfer.credit_account_id {
            return R::AccountsMustBeDifferent;
        }
        if transfer.pending_id != 0 {
            return R::PendingIdMustBeZero;
        }
        if transfer.ledger == 0 {
            return R::LedgerMustNotBeZero;
        }
        if transfer.code == 0 {
            return R::CodeMustNotBeZero;
        }

        let Some(debit) = self.accounts.get(&transfer.debit_account_id).copied() else {
            return R::DebitAccountNotFound;
        };
        let Some(credit) = self.accounts.get(&transfer.credit_account_id).copied() else {
            return R::CreditAccountNotFound;
        };
        if debit.ledger != credit.ledger {
            return R::AccountsMustHaveTheSameLedger;
        }
        if transfer.ledger != debit.ledger {
            return R::TransferMustHaveTheSameLedgerAsAccounts;
        }
        if self.transfer_index.contains_key(&transfer.id) {
            return R::Exists;
        }
        if debit.has_flag(AccountFlags::CLOSED) {
            return R::DebitAccountAlreadyClosed;
        }
        if credit.has_flag(AccountFlags::CLOSED) {
            return R::CreditAccountAlreadyClosed;
        }

        let debits_after = debit
            .debits_pending
            .saturating_add(debit.debits_posted)
            .saturating_add(transfer.amount);
        if debit.has_flag(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS) && debits_after > debit.credits_posted {
            return R::ExceedsCredits;
        }
        let credits_after = credit
            .credits_pending
            .saturating_add(credit.credits_posted)
            .saturating_add(transfer.amount);
        if credit.has_flag(AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS) && credits_after > credit.debits_posted {
            return R::ExceedsDebits;
        }

        let timestamp = self.tick();
        if let Some(account) = self.accounts.get_mut(&transfer.debit_account_id) {
            account.debits_posted = account.debits_posted.saturating_add(transfer.amount);
        }
        if let Some(account) = self.accounts.get_mut(&transfer.credit_account_id) {
            account.credits_posted = account.credits_posted.saturating_add(transfer.amount);
        }

        let mut stored = *transfer;
        stored.timestamp = timestamp;
        self.transfer_index.insert(stored.id, self.transfers.len());
        self.transfers.push(stored);
        R::Ok
    }

    pub fn lookup_accounts(&self, ids: &[u128]) -> Vec<Account> {
        ids.iter().filter_map(|id| self.accounts.get(id).copied()).collect()
    }

    /// Accounts matching `filter`, in creation order.
    pub fn query_accounts(&self, filter: &QueryFilter) -> Vec<Account> {
        let mut matches: Vec<Account> = self
            .accounts
            .values()
            .filter(|a| filter.ledger == 0 || a.ledger == filter.ledger)
            .filter(|a| filter.code == 0 || a.code == filter.code)
            .filter(|a| filter.user_data_128 == 0 || a.user_data_128 == filter.user_data_128)
            .filter(|a| filter.user_data_64 == 0 || a.user_data_64 == filter.user_data_64)
            .filter(|a| filter.user_data_32 == 0 || a.user_data_32 == filter.user_data_32)
            .filter(|a| in_range(a.timestamp, filter.timestamp_min, filter.timestamp_max))
            .copied()
            .collect();

        matches.sort_by_key(|a| a.timestamp);
        if filter.flags & QueryFilterFlags::REVERSED != 0 {
            matches.reverse();
        }
        matches.truncate(filter.limit as usize);
        matches
    }

    /// Transfers touching `filter.account_id`, in commit order.
    pub fn get_account_transfers(&self, filter: &AccountFilter) -> Vec<Transfer> {
        let mut matches: Vec<Transfer> = self
            .transfers
            .iter()
            .filter(|t| {
                (filter.includes_debits() && t.debit_account_id == filter.account_id)
                    || (filter.includes_credits() && t.credit_account_id == filter.account_id)
            })
            .filter(|t| filter.code == 0 || t.code == filter.code)
            .filter(|t| in_range(t.timestamp, filter.timestamp_min, filter.timestamp_max))
            .copied()
            .collect();

        if filter.flags & AccountFilterFlags::REVERSED != 0 {
            matches.reverse();
        }
        matches.truncate(filter.limit as usize);
        matches
    }
}

fn in_range(timestamp: u64, min: u64, max: u64) -> bool {
    timestamp >= min && (max == 0 || timestamp <= max)
}

/// Check a comma-separated address list the way the native client does:
/// each entry is a port, or `host:port`.
fn validate_addresses(address: &str) -> Result<(), InitStatus> {
    let entries: Vec<&str> = address.split(',').map(str::trim).collect();
    if entries.len() > MAX_ADDRESSES {
        return Err(InitStatus::AddressLimitExceeded);
    }
    for entry in entries {
        let port = match entry.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => port,
            Some(_) => return Err(InitStatus::AddressInvalid),
            None => entry,
        };
        if port.parse::<u16>().map_or(true, |p| p == 0) {
            return Err(InitStatus::AddressInvalid);
        }
    }
    Ok(())
}

struct SlotPtr(*mut RequestSlot);

// SAFETY: the slot is owned by the client between submit and completion and is
// only touched by the IO thread during that span.
unsafe impl Send for SlotPtr {}

enum Job {
    Request(SlotPtr),
    Shutdown,
}

struct Session {
    handle_addr: usize,
    jobs: Sender<Job>,
    io_thread: Option<JoinHandle<()>>,
}

/// Knobs for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct SimulatorOptions {
    /// Delay before each request is executed.
    pub latency: Duration,
    /// Make `init` fail with this status.
    pub init_failure: Option<InitStatus>,
}

pub struct SimulatedLedger {
    book: Arc<Mutex<LedgerBook>>,
    session: Mutex<Option<Session>>,
    options: SimulatorOptions,
    stalled: Arc<AtomicBool>,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl SimulatedLedger {
    pub fn new() -> Self {
        Self::with_options(SimulatorOptions::default())
    }

    pub fn with_options(options: SimulatorOptions) -> Self {
        Self {
            book: Arc::new(Mutex::new(LedgerBook::new())),
            session: Mutex::new(None),
            options,
            stalled: Arc::new(AtomicBool::new(false)),
            arrivals: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of the simulated cluster state.
    pub fn book(&self) -> Arc<Mutex<LedgerBook>> {
        Arc::clone(&self.book)
    }

    /// While stalled, accepted requests are held without completing until `deinit`.
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    /// When each request reached the IO thread.
    pub fn arrivals(&self) -> Vec<Instant> {
        self.arrivals.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.session.lock().is_some()
    }
}

impl Default for SimulatedLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimulatedLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedLedger")
            .field("running", &self.is_running())
            .field("options", &self.options)
            .finish()
    }
}

impl ClientDriver for SimulatedLedger {
    fn name(&self) -> &'static str {
        "simulated"
    }

    unsafe fn init(
        &self,
        handle: *mut RawClient,
        cluster_id: u128,
        address: &str,
        context: usize,
        completion: CompletionFn,
    ) -> InitStatus {
        if let Some(status) = self.options.init_failure {
            return status;
        }
        if handle.is_null() {
            return InitStatus::Unexpected;
        }
        if let Err(status) = validate_addresses(address) {
            return status;
        }

        let mut session = self.session.lock();
        if session.is_some() {
            return InitStatus::Unexpected;
        }

        let (jobs, queue) = async_channel::unbounded();
        let worker = IoWorker {
            context,
            completion,
            queue,
            book: Arc::clone(&self.book),
            stalled: Arc::clone(&self.stalled),
            arrivals: Arc::clone(&self.arrivals),
            latency: self.options.latency,
        };
        let io_thread = match std::thread::Builder::new()
            .name("ledger-client-io".to_string())
            .spawn(move || worker.run())
        {
            Ok(thread) => thread,
            Err(err) => {
                tracing::error!(error = %err, "Failed to spawn simulated IO thread");
                return InitStatus::SystemResources;
            }
        };

        // SAFETY: caller guarantees `handle` is valid, writable and pinned until deinit.
        handle.write(RawClient {
            opaque: [handle as usize as u64, cluster_id as u64, (cluster_id >> 64) as u64, 0],
        });
        *session = Some(Session {
            handle_addr: handle as usize,
            jobs,
            io_thread: Some(io_thread),
        });

        tracing::debug!(cluster_id, address, "Simulated client initialized");
        InitStatus::Success
    }

    unsafe fn submit(&self, handle: *mut RawClient, slot: *mut RequestSlot) -> ClientStatus {
        if handle.is_null() || slot.is_null() {
            return ClientStatus::Invalid;
        }
        // SAFETY: caller guarantees the handle was initialized.
        let recorded = (*handle).opaque[0] as usize;
        let session = self.session.lock();
        let Some(session) = session.as_ref() else {
            return ClientStatus::Invalid;
        };
        if recorded != handle as usize || session.handle_addr != recorded {
            tracing::error!(
                expected = session.handle_addr,
                actual = handle as usize,
                "Client handle moved after init"
            );
            return ClientStatus::Invalid;
        }

        match session.jobs.try_send(Job::Request(SlotPtr(slot))) {
            Ok(()) => ClientStatus::Ok,
            Err(_) => ClientStatus::Invalid,
        }
    }

    unsafe fn deinit(&self, handle: *mut RawClient) {
        let Some(mut session) = self.session.lock().take() else {
            return;
        };
        if session.handle_addr != handle as usize {
            tracing::warn!("Deinit through a different handle address than init");
        }

        if let Err(err) = session.jobs.try_send(Job::Shutdown) {
            tracing::warn!(error = %err, "Simulated IO thread already stopped");
        }
        if let Some(thread) = session.io_thread.take() {
            if thread.join().is_err() {
                tracing::error!("Simulated IO thread panicked");
            }
        }
        if !handle.is_null() {
            // SAFETY: caller guarantees the handle is still valid storage.
            handle.write(RawClient::default());
        }
        tracing::debug!("Simulated client deinitialized");
    }
}

struct IoWorker {
    context: usize,
    completion: CompletionFn,
    queue: Receiver<Job>,
    book: Arc<Mutex<LedgerBook>>,
    stalled: Arc<AtomicBool>,
    arrivals: Arc<Mutex<Vec<Instant>>>,
    latency: Duration,
}

impl IoWorker {
    fn run(self) {
        let mut held = Vec::new();

        while let Ok(job) = self.queue.recv_blocking() {
            match job {
                Job::Request(slot) => {
                    self.arrivals.lock().push(Instant::now());
                    if self.stalled.load(Ordering::SeqCst) {
                        held.push(slot);
                        continue;
                    }
                    if !self.latency.is_zero() {
                        std::thread::sleep(self.latency);
                    }
                    self.serve(slot.0);
                }
                Job::Shutdown => break,
            }
        }

        while let Ok(Job::Request(slot)) = self.queue.try_recv() {
            held.push(slot);
        }
        for slot in held {
            self.finish(slot.0, PacketStatus::ClientShutdown, Vec::new());
        }
    }

    fn serve(&self, slot: *mut RequestSlot) {
        // SAFETY: the slot and its payload belong to the client until `finish`.
        let (operation, payload) = unsafe {
            let header = &*slot;
            let payload = if header.data.is_null() || header.data_size == 0 {
                Vec::new()
            } else {
                std::slice::from_raw_parts(header.data as *const u8, header.data_size as usize).to_vec()
            };
            (header.operation, payload)
        };

        let outcome = match LedgerOperation::from_code(operation) {
            Some(op) => self.execute(op, &payload),
            None => Err(PacketStatus::InvalidOperation),
        };
        match outcome {
            Ok(reply) => self.finish(slot, PacketStatus::Ok, reply),
            Err(status) => self.finish(slot, status, Vec::new()),
        }
    }

    fn execute(&self, operation: LedgerOperation, payload: &[u8]) -> Result<Vec<u8>, PacketStatus> {
        let mut book = self.book.lock();
        match operation {
            LedgerOperation::CreateAccounts => {
                let accounts: Vec<Account> = decode_batch(payload)?;
                let rejected = rejections(&accounts, |a| book.create_account(a).code());
                encode(&rejected)
            }
            LedgerOperation::CreateTransfers => {
                let transfers: Vec<Transfer> = decode_batch(payload)?;
                let rejected = rejections(&transfers, |t| book.create_transfer(t).code());
                encode(&rejected)
            }
            LedgerOperation::LookupAccounts => {
                let ids: Vec<u128> = decode_batch(payload)?;
                encode(&book.lookup_accounts(&ids))
            }
            LedgerOperation::QueryAccounts => {
                let filter: QueryFilter = decode_single(payload)?;
                encode(&book.query_accounts(&filter))
            }
            LedgerOperation::GetAccountTransfers => {
                let filter: AccountFilter = decode_single(payload)?;
                encode(&book.get_account_transfers(&filter))
            }
            _ => Err(PacketStatus::InvalidOperation),
        }
    }

    fn finish(&self, slot: *mut RequestSlot, status: PacketStatus, mut reply: Vec<u8>) {
        // SAFETY: still owned by the client until the callback below returns.
        unsafe { (*slot).status = status.as_raw() };
        let timestamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0).max(0) as u64;
        (self.completion)(self.context, slot, timestamp, reply.as_ptr(), reply.len() as u32);
        reply.fill(POISON);
    }
}

fn decode_batch<T: WireRecord>(payload: &[u8]) -> Result<Vec<T>, PacketStatus> {
    if payload.is_empty() {
        return Err(PacketStatus::InvalidDataSize);
    }
    records(payload)
        .map(|batch| batch.collect())
        .map_err(|_| PacketStatus::InvalidDataSize)
}

fn decode_single<T: WireRecord>(payload: &[u8]) -> Result<T, PacketStatus> {
    if payload.len() != T::SIZE {
        return Err(PacketStatus::InvalidDataSize);
    }
    Ok(T::read_from(payload))
}

fn rejections<T>(events: &[T], mut apply: impl FnMut(&T) -> u32) -> Vec<CreateResult> {
    events
        .iter()
        .enumerate()
        .filter_map(|(index, event)| {
            let result = apply(event);
            (result != CreateAccountResult::Ok.code()).then_some(CreateResult {
                index: index as u32,
                result,
            })
        })
        .collect()
}

fn encode<T: WireRecord>(items: &[T]) -> Result<Vec<u8>, PacketStatus> {
    let mut out = vec![0u8; items.len() * T::SIZE];
    encode_records(items, &mut out).map_err(|_| PacketStatus::TooMuchData)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn ignore_completion(_: usize, _: *mut RequestSlot, _: u64, _: *const u8, _: u32) {}

    fn book_with_two_accounts() -> LedgerBook {
        let mut book = LedgerBook::new();
        assert_eq!(book.create_account(&Account::new(1, 1, 1)), CreateAccountResult::Ok);
        assert_eq!(book.create_account(&Account::new(2, 1, 1)), CreateAccountResult::Ok);
        book
    }

    #[test]
    fn test_create_account_validation() {
        let mut book = book_with_two_accounts();
        assert_eq!(book.create_account(&Account::new(0, 1, 1)), CreateAccountResult::IdMustNotBeZero);
        assert_eq!(book.create_account(&Account::new(3, 0, 1)), CreateAccountResult::LedgerMustNotBeZero);
        assert_eq!(book.create_account(&Account::new(3, 1, 0)), CreateAccountResult::CodeMustNotBeZero);
        assert_eq!(book.create_account(&Account::new(1, 1, 1)), CreateAccountResult::Exists);
        assert_eq!(book.create_account(&Account::new(1, 2, 1)), CreateAccountResult::ExistsWithDifferentLedger);
        assert_eq!(book.account_count(), 2);
        assert_ne!(book.account(1).unwrap().timestamp, 0);
    }

    #[test]
    fn test_transfer_moves_balances() {
        let mut book = book_with_two_accounts();
        let transfer = Transfer::new(100, 1, 2, 250, 1, 1);
        assert_eq!(book.create_transfer(&transfer), CreateTransferResult::Ok);
        assert_eq!(book.create_transfer(&transfer), CreateTransferResult::Exists);

        assert_eq!(book.account(1).unwrap().debits_posted, 250);
        assert_eq!(book.account(2).unwrap().credits_posted, 250);
        assert_eq!(book.transfer_count(), 1);
    }

    #[test]
    fn test_transfer_validation() {
        let mut book = book_with_two_accounts();
        assert_eq!(
            book.create_transfer(&Transfer::new(1, 1, 1, 5, 1, 1)),
            CreateTransferResult::AccountsMustBeDifferent
        );
        assert_eq!(
            book.create_transfer(&Transfer::new(1, 1, 9, 5, 1, 1)),
            CreateTransferResult::CreditAccountNotFound
        );
        assert_eq!(
            book.create_transfer(&Transfer::new(1, 1, 2, 5, 7, 1)),
            CreateTransferResult::TransferMustHaveTheSameLedgerAsAccounts
        );

        let mut limited = Account::new(3, 1, 1);
        limited.flags = AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS;
        book.create_account(&limited);
        assert_eq!(
            book.create_transfer(&Transfer::new(2, 3, 1, 1, 1, 1)),
            CreateTransferResult::ExceedsCredits
        );
    }

    #[test]
    fn test_query_accounts_filters_and_limits() {
        let mut book = book_with_two_accounts();
        book.create_account(&Account::new(3, 2, 1));

        let ids: Vec<u128> = book.query_accounts(&QueryFilter::for_ledger(1, 10)).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let mut filter = QueryFilter::for_ledger(0, 2);
        filter.flags = QueryFilterFlags::REVERSED;
        let ids: Vec<u128> = book.query_accounts(&filter).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2]);

        assert!(book.query_accounts(&QueryFilter::for_ledger(1, 0)).is_empty());
    }

    #[test]
    fn test_account_transfers_cover_both_sides() {
        let mut book = book_with_two_accounts();
        book.create_account(&Account::new(3, 1, 1));
        book.create_transfer(&Transfer::new(10, 1, 2, 5, 1, 1));
        book.create_transfer(&Transfer::new(11, 2, 3, 5, 1, 1));
        book.create_transfer(&Transfer::new(12, 3, 1, 5, 1, 1));

        let ids: Vec<u128> = book
            .get_account_transfers(&AccountFilter::for_account(2, 10))
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![10, 11]);

        let mut debits_only = AccountFilter::for_account(1, 10);
        debits_only.flags = AccountFilterFlags::DEBITS;
        assert_eq!(book.get_account_transfers(&debits_only).len(), 1);
    }

    #[test]
    fn test_address_validation() {
        assert_eq!(validate_addresses("3000"), Ok(()));
        assert_eq!(validate_addresses("127.0.0.1:3000,127.0.0.1:3001"), Ok(()));
        assert_eq!(validate_addresses("not-a-port"), Err(InitStatus::AddressInvalid));
        assert_eq!(validate_addresses(":3000"), Err(InitStatus::AddressInvalid));
        assert_eq!(validate_addresses(""), Err(InitStatus::AddressInvalid));
        assert_eq!(
            validate_addresses("1,2,3,4,5,6,7"),
            Err(InitStatus::AddressLimitExceeded)
        );
    }

    #[test]
    fn test_submit_through_moved_handle_is_rejected() {
        let driver = SimulatedLedger::new();
        let mut pinned = Box::new(RawClient::default());
        let status = unsafe { driver.init(&mut *pinned, 0, "3000", 0, ignore_completion) };
        assert_eq!(status, InitStatus::Success);

        let mut moved = RawClient {
            opaque: pinned.opaque,
        };
        let mut slot = RequestSlot::empty();
        let status = unsafe { driver.submit(&mut moved, &mut slot) };
        assert_eq!(status, ClientStatus::Invalid);

        unsafe { driver.deinit(&mut *pinned) };
        assert!(!driver.is_running());
    }

    #[test]
    fn test_init_failure_option() {
        let driver = SimulatedLedger::with_options(SimulatorOptions {
            init_failure: Some(InitStatus::NetworkSubsystem),
            ..SimulatorOptions::default()
        });
        let mut handle = Box::new(RawClient::default());
        let status = unsafe { driver.init(&mut *handle, 0, "3000", 0, ignore_completion) };
        assert_eq!(status, InitStatus::NetworkSubsystem);
        assert!(!driver.is_running());
    }

    #[test]
    fn test_second_init_without_deinit_is_rejected() {
        let driver = SimulatedLedger::new();
        let mut first = Box::new(RawClient::default());
        let mut second = Box::new(RawClient::default());
        assert_eq!(
            unsafe { driver.init(&mut *first, 0, "3000", 0, ignore_completion) },
            InitStatus::Success
        );
        assert_eq!(
            unsafe { driver.init(&mut *second, 0, "3000", 0, ignore_completion) },
            InitStatus::Unexpected
        );
        unsafe { driver.deinit(&mut *first) };
    }
}
