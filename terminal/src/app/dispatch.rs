//! # Cross-Thread Dispatcher
//!
//! Moves [`AppEvent`]s from any thread onto the UI thread's event channel and
//! wakes the UI so it drains them on the next frame.
//!
//! Delayed dispatch runs on the tokio runtime timer; no thread ever sleeps on
//! behalf of the UI. Events arrive in send order and cannot be cancelled.

use std::sync::Arc;
use std::time::Duration;

use async_channel::Sender;
use once_cell::sync::OnceCell;
use tokio::runtime::Handle;

use crate::app::AppEvent;
use crate::utils::runtime::TOKIO_RT;

type Waker = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct Dispatcher {
    tx: Sender<AppEvent>,
    runtime: Handle,
    waker: Arc<OnceCell<Waker>>,
}

impl Dispatcher {
    /// Uses the ambient tokio runtime if there is one, the shared background runtime otherwise.
    pub fn new(tx: Sender<AppEvent>) -> Self {
        let runtime = Handle::try_current().unwrap_or_else(|_| TOKIO_RT.handle().clone());
        Self {
            tx,
            runtime,
            waker: Arc::new(OnceCell::new()),
        }
    }

    /// Install the UI wake-up hook (egui's `request_repaint`). Only the first call takes effect.
    pub fn set_waker<F>(&self, waker: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.waker.set(Arc::new(waker)).is_err() {
            tracing::debug!("UI waker already installed");
        }
    }

    /// Send `event` to the UI thread now. Returns false if the UI is gone.
    pub fn dispatch_to_main(&self, event: AppEvent) -> bool {
        let event_id = crate::debug::track_event_send(event.name());
        match self.tx.try_send(event) {
            Ok(()) => {
                self.wake();
                true
            }
            Err(err) => {
                tracing::debug!(event_id, error = %err, "Event channel closed - dropping event");
                false
            }
        }
    }

    /// Send `event` to the UI thread after `delay`.
    pub fn dispatch_after(&self, delay: Duration, event: AppEvent) {
        let dispatcher = self.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            dispatcher.dispatch_to_main(event);
        });
    }

    fn wake(&self) {
        if let Some(waker) = self.waker.get() {
            waker();
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("queued", &self.tx.len())
            .field("waker", &self.waker.get().is_some())
            .finish()
    }
}
