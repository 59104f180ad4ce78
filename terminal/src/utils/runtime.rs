//! Background tokio runtime.
//!
//! egui owns the main thread and runs no async executor, so delayed dispatch
//! (settle delays, watchdogs) is scheduled here when no runtime is ambient.
//!
//! ```rust,no_run
//! use ledger_terminal::utils::runtime::TOKIO_RT;
//!
//! TOKIO_RT.spawn(async move {
//!     tokio::time::sleep(std::time::Duration::from_millis(50)).await;
//! });
//! ```

use once_cell::sync::Lazy;
use tokio::runtime::{Builder, Runtime};

pub static TOKIO_RT: Lazy<Runtime> = Lazy::new(|| {
    Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("ledger-timers")
        .enable_time()
        .build()
        .expect("Failed to create Tokio runtime for delayed dispatch")
});
