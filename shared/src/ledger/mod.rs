//! # Ledger Wire Records
//!
//! Binary records exchanged with the ledger cluster through the native client.
//!
//! ## Module Organization
//!
//! - [`account`] - `Account` record and account flags
//! - [`transfer`] - `Transfer` record and transfer flags
//! - [`filter`] - `QueryFilter` and `AccountFilter` request payloads
//! - [`codes`] - operation codes and create-result codes
//!
//! ## Encoding
//!
//! Records are `#[repr(C)]` [`Pod`] structs laid out exactly like the native
//! client's, so encoding is a byte copy. Length validation happens once, at
//! the slice boundary, in [`records`] and [`encode_records`].

pub mod account;
pub mod codes;
pub mod filter;
pub mod transfer;

pub use account::*;
pub use codes::*;
pub use filter::*;
pub use transfer::*;

use bytemuck::Pod;
use thiserror::Error;

/// Errors raised when a byte buffer does not line up with a record layout.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum WireError {
    /// Buffer length is not a whole number of records.
    #[error("{len} bytes is not a multiple of the {record_size}-byte record size")]
    Misaligned { len: usize, record_size: usize },

    /// Output buffer cannot hold the encoded records.
    #[error("need {needed} bytes but only {available} are available")]
    BufferTooSmall { needed: usize, available: usize },
}

/// A fixed-size ledger record in native (little-endian) byte order.
pub trait WireRecord: Pod {
    /// Encoded size in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Encode into `out`, which must be exactly `SIZE` bytes.
    fn write_to(&self, out: &mut [u8]) {
        out.copy_from_slice(bytemuck::bytes_of(self));
    }

    /// Decode from `bytes`, which must be exactly `SIZE` bytes.
    fn read_from(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(bytes)
    }
}

#[cfg(target_endian = "big")]
compile_error!("ledger wire records assume a little-endian target");

/// Bare identifiers, as sent to `lookup_accounts`.
impl WireRecord for u128 {}

/// Iterate the records packed in `bytes`.
///
/// Fails if `bytes` is not a whole number of records.
pub fn records<'a, T: WireRecord + 'a>(
    bytes: &'a [u8],
) -> Result<impl Iterator<Item = T> + 'a, WireError> {
    if bytes.len() % T::SIZE != 0 {
        return Err(WireError::Misaligned {
            len: bytes.len(),
            record_size: T::SIZE,
        });
    }
    Ok(bytes.chunks_exact(T::SIZE).map(T::read_from))
}

/// Encode `items` back to back into `out`, returning the number of bytes written.
pub fn encode_records<T: WireRecord>(items: &[T], out: &mut [u8]) -> Result<usize, WireError> {
    let needed = items.len() * T::SIZE;
    if needed > out.len() {
        return Err(WireError::BufferTooSmall {
            needed,
            available: out.len(),
        });
    }
    out[..needed].copy_from_slice(bytemuck::cast_slice(items));
    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_rejects_partial_record() {
        let bytes = [0u8; Account::SIZE + 3];
        let err = records::<Account>(&bytes).err();
        assert_eq!(
            err,
            Some(WireError::Misaligned {
                len: Account::SIZE + 3,
                record_size: Account::SIZE
            })
        );
    }

    #[test]
    fn test_records_empty_buffer_yields_nothing() {
        let count = records::<Transfer>(&[]).unwrap().count();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_encode_records_checks_capacity() {
        let accounts = [Account::new(1, 1, 1), Account::new(2, 1, 1)];
        let mut out = [0u8; Account::SIZE];
        let err = encode_records(&accounts, &mut out).unwrap_err();
        assert_eq!(
            err,
            WireError::BufferTooSmall {
                needed: 2 * Account::SIZE,
                available: Account::SIZE
            }
        );
    }

    #[test]
    fn test_record_sizes_match_native_layout() {
        assert_eq!(Account::SIZE, 128);
        assert_eq!(Transfer::SIZE, 128);
        assert_eq!(QueryFilter::SIZE, 64);
        assert_eq!(AccountFilter::SIZE, 128);
        assert_eq!(CreateResult::SIZE, 8);
        assert_eq!(<u128 as WireRecord>::SIZE, 16);
    }

    #[test]
    fn test_encode_records_packs_back_to_back() {
        let accounts = [Account::new(1, 1, 1), Account::new(2, 1, 1)];
        let mut out = [0u8; 2 * Account::SIZE];
        let written = encode_records(&accounts, &mut out).unwrap();
        assert_eq!(written, 256);

        let ids: Vec<u128> = records::<Account>(&out).unwrap().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
