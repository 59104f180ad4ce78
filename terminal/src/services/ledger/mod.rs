//! # Ledger Client Layer
//!
//! Everything between the UI thread and the native ledger client.
//!
//! ## Module Organization
//!
//! - [`ffi`] - C-layout request slot, status codes and the [`ClientDriver`] seam
//! - [`pool`] - fixed pool of request slots with per-slot payload buffers
//! - [`binding`] - pinned client handle and typed submissions
//! - [`bridge`] - completion callback and the state it may touch
//! - [`sequencer`] - request sequence numbers and the completion rate limiter
//! - [`mailbox`] - single-slot result handoff to the UI thread
//! - [`staging`] - owned copies of reply records
//! - [`result`] - routing tags and [`OperationResult`]
//! - [`simulator`] - in-process [`ClientDriver`] backed by an in-memory ledger
//!
//! ## Request Lifecycle
//!
//! ```text
//! UI thread                          IO thread (client-owned)
//! ─────────                          ────────────────────────
//! pool.acquire()
//! encode payload, set tag/sequence
//! driver.submit(slot) ─────────────▶ execute
//!                                    on_completion(slot, reply)
//!                                      pool.release(slot)
//!                                      stage reply records
//!                                      sequencer.record_completion
//!                                      mailbox.deposit
//! AppEvent::Completion ◀────────────   dispatcher.dispatch_to_main
//! mailbox.take() → sync entities
//! ```

pub mod binding;
pub mod bridge;
pub mod ffi;
pub mod mailbox;
pub mod pool;
pub mod result;
pub mod sequencer;
pub mod simulator;
pub mod staging;

pub use binding::{ConnectError, ConnectionHandle, SubmitError};
pub use bridge::WorkerBridge;
pub use ffi::{ClientDriver, InitStatus, PacketStatus};
#[cfg(feature = "native-client")]
pub use ffi::NativeDriver;
pub use mailbox::{Delivery, ResultMailbox};
pub use pool::{PoolStats, RequestPool, DEFAULT_POOL_CAPACITY};
pub use result::{OperationResult, RoutingTag, TransportError};
pub use sequencer::Sequencer;
pub use simulator::{LedgerBook, SimulatedLedger, SimulatorOptions};
pub use staging::{Staging, StagingBuffer, MAX_ACCOUNTS, MAX_TRANSFERS};
