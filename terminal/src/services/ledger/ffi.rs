//! # Native Client Seam
//!
//! `#[repr(C)]` types shared with the ledger's native client library and the
//! [`ClientDriver`] trait that abstracts over it.
//!
//! The client is callback driven: [`ClientDriver::submit`] hands over a
//! [`RequestSlot`] and returns immediately, and the client later invokes the
//! [`CompletionFn`] registered at init time on its own IO thread. The reply
//! bytes passed to the callback are only valid for the duration of the call.

use std::ffi::c_void;

/// Size of the payload buffer each [`RequestSlot`] owns (one 128-byte record).
pub const SLOT_PAYLOAD_BYTES: usize = 128;

/// One request in flight, laid out exactly as the native client's packet.
///
/// The client owns `opaque` while the request is in flight and links slots
/// through it, so a submitted slot must not move or be touched until its
/// completion fires.
#[repr(C)]
#[derive(Debug)]
pub struct RequestSlot {
    /// Caller context, returned untouched in the completion. Carries the submission sequence.
    pub user_data: *mut c_void,
    pub data: *const c_void,
    pub data_size: u32,
    /// Routing tag, see `RoutingTag`.
    pub user_tag: u16,
    pub operation: u8,
    pub status: u8,
    pub opaque: [u8; 64],
}

impl RequestSlot {
    pub const fn empty() -> Self {
        Self {
            user_data: std::ptr::null_mut(),
            data: std::ptr::null(),
            data_size: 0,
            user_tag: 0,
            operation: 0,
            status: 0,
            opaque: [0; 64],
        }
    }

    pub fn reset(&mut self) {
        *self = Self::empty();
    }

    /// Submission sequence stored in `user_data`.
    pub fn sequence(&self) -> u32 {
        self.user_data as usize as u32
    }
}

/// Opaque client handle.
///
/// The native client stores pointers into this struct during init, so it must
/// be initialized at its final address and never moved afterwards.
#[repr(C)]
#[derive(Debug, Default)]
pub struct RawClient {
    pub opaque: [u64; 4],
}

/// Completion callback: `(context, slot, timestamp, reply_ptr, reply_len)`.
pub type CompletionFn =
    extern "C" fn(context: usize, slot: *mut RequestSlot, timestamp: u64, result: *const u8, result_len: u32);

/// Per-request status written into [`RequestSlot::status`] before completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketStatus {
    Ok,
    TooMuchData,
    ClientEvicted,
    ClientReleaseTooLow,
    ClientReleaseTooHigh,
    ClientShutdown,
    InvalidOperation,
    InvalidDataSize,
    Unknown(u8),
}

impl PacketStatus {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Ok,
            1 => Self::TooMuchData,
            2 => Self::ClientEvicted,
            3 => Self::ClientReleaseTooLow,
            4 => Self::ClientReleaseTooHigh,
            5 => Self::ClientShutdown,
            6 => Self::InvalidOperation,
            7 => Self::InvalidDataSize,
            other => Self::Unknown(other),
        }
    }

    pub fn as_raw(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::TooMuchData => 1,
            Self::ClientEvicted => 2,
            Self::ClientReleaseTooLow => 3,
            Self::ClientReleaseTooHigh => 4,
            Self::ClientShutdown => 5,
            Self::InvalidOperation => 6,
            Self::InvalidDataSize => 7,
            Self::Unknown(raw) => raw,
        }
    }
}

/// Result of client initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitStatus {
    Success,
    Unexpected,
    OutOfMemory,
    AddressInvalid,
    AddressLimitExceeded,
    SystemResources,
    NetworkSubsystem,
    Unknown(u32),
}

impl InitStatus {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Success,
            1 => Self::Unexpected,
            2 => Self::OutOfMemory,
            3 => Self::AddressInvalid,
            4 => Self::AddressLimitExceeded,
            5 => Self::SystemResources,
            6 => Self::NetworkSubsystem,
            other => Self::Unknown(other),
        }
    }
}

/// Result of `submit` / `deinit`. `Invalid` means the handle is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientStatus {
    Ok,
    Invalid,
}

impl ClientStatus {
    pub fn from_raw(raw: u32) -> Self {
        if raw == 0 {
            Self::Ok
        } else {
            Self::Invalid
        }
    }
}

/// The native client's C surface.
///
/// Implemented by [`super::simulator::SimulatedLedger`] for in-process use and
/// by [`NativeDriver`] when the `native-client` feature links the real library.
pub trait ClientDriver: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Initialize the client in place at `handle`.
    ///
    /// # Safety
    ///
    /// `handle` must point to writable storage that stays at the same address
    /// until [`ClientDriver::deinit`] returns. `context` is passed back verbatim
    /// to `completion` and must stay valid for the same span.
    unsafe fn init(
        &self,
        handle: *mut RawClient,
        cluster_id: u128,
        address: &str,
        context: usize,
        completion: CompletionFn,
    ) -> InitStatus;

    /// Queue `slot` for execution.
    ///
    /// # Safety
    ///
    /// `handle` must have been initialized by [`ClientDriver::init`] and not yet
    /// deinitialized. On `Ok`, `slot` and its payload belong to the client
    /// until the completion for it fires.
    unsafe fn submit(&self, handle: *mut RawClient, slot: *mut RequestSlot) -> ClientStatus;

    /// Stop the client, completing any pending slots with `ClientShutdown`.
    /// Returns once no further completion can fire.
    ///
    /// # Safety
    ///
    /// `handle` must have been initialized by [`ClientDriver::init`].
    unsafe fn deinit(&self, handle: *mut RawClient);
}

#[cfg(feature = "native-client")]
mod native {
    use super::*;
    use std::os::raw::c_char;

    #[link(name = "tb_client")]
    extern "C" {
        fn tb_client_init(
            client_out: *mut RawClient,
            cluster_id: *const u8,
            address_ptr: *const c_char,
            address_len: u32,
            completion_ctx: usize,
            completion_callback: CompletionFn,
        ) -> u32;

        fn tb_client_submit(client: *mut RawClient, packet: *mut RequestSlot) -> u32;

        fn tb_client_deinit(client: *mut RawClient) -> u32;
    }

    /// Driver backed by the linked `tb_client` library.
    #[derive(Debug, Default)]
    pub struct NativeDriver;

    impl ClientDriver for NativeDriver {
        fn name(&self) -> &'static str {
            "tb_client"
        }

        unsafe fn init(
            &self,
            handle: *mut RawClient,
            cluster_id: u128,
            address: &str,
            context: usize,
            completion: CompletionFn,
        ) -> InitStatus {
            let Ok(address_len) = u32::try_from(address.len()) else {
                return InitStatus::AddressInvalid;
            };
            let cluster = cluster_id.to_le_bytes();
            let raw = tb_client_init(
                handle,
                cluster.as_ptr(),
                address.as_ptr().cast::<c_char>(),
                address_len,
                context,
                completion,
            );
            InitStatus::from_raw(raw)
        }

        unsafe fn submit(&self, handle: *mut RawClient, slot: *mut RequestSlot) -> ClientStatus {
            ClientStatus::from_raw(tb_client_submit(handle, slot))
        }

        unsafe fn deinit(&self, handle: *mut RawClient) {
            if ClientStatus::from_raw(tb_client_deinit(handle)) == ClientStatus::Invalid {
                tracing::warn!("tb_client_deinit reported an invalid handle");
            }
        }
    }
}

#[cfg(feature = "native-client")]
pub use native::NativeDriver;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_slot_matches_native_packet_layout() {
        assert_eq!(std::mem::offset_of!(RequestSlot, data_size), 16);
        assert_eq!(std::mem::offset_of!(RequestSlot, user_tag), 20);
        assert_eq!(std::mem::offset_of!(RequestSlot, operation), 22);
        assert_eq!(std::mem::offset_of!(RequestSlot, status), 23);
        assert_eq!(std::mem::offset_of!(RequestSlot, opaque), 24);
        assert_eq!(std::mem::size_of::<RawClient>(), 32);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PacketStatus::from_raw(5), PacketStatus::ClientShutdown);
        assert_eq!(PacketStatus::from_raw(42), PacketStatus::Unknown(42));
        assert_eq!(PacketStatus::InvalidDataSize.as_raw(), 7);
        assert_eq!(InitStatus::from_raw(3), InitStatus::AddressInvalid);
        assert_eq!(InitStatus::from_raw(99), InitStatus::Unknown(99));
        assert_eq!(ClientStatus::from_raw(1), ClientStatus::Invalid);
    }

    #[test]
    fn test_sequence_round_trips_through_user_data() {
        let mut slot = RequestSlot::empty();
        slot.user_data = 4_000_000_000usize as *mut c_void;
        assert_eq!(slot.sequence(), 4_000_000_000);
        slot.reset();
        assert!(slot.user_data.is_null());
    }
}
