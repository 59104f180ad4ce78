//! # Connection State Machine
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──init ok──▶ Registering ──▶ Ready
//!      ▲                        │                                    │
//!      └────────init failed─────┘◀──────────────disconnect───────────┘
//! ```
//!
//! `connect` is a no-op unless `Disconnected`; `disconnect` is idempotent.

use std::sync::Arc;

use crate::core::config::LedgerConfig;
use crate::services::ledger::{ClientDriver, ConnectError, ConnectionHandle, WorkerBridge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Registering,
    Ready,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Registering => "Registering",
            ConnectionState::Ready => "Ready",
        }
    }
}

pub struct Connection {
    state: ConnectionState,
    driver: Arc<dyn ClientDriver>,
    handle: Option<ConnectionHandle>,
}

impl Connection {
    pub fn new(driver: Arc<dyn ClientDriver>) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            driver,
            handle: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn can_submit(&self) -> bool {
        self.state == ConnectionState::Ready && self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&ConnectionHandle> {
        self.handle.as_ref()
    }

    pub fn connect(&mut self, config: &LedgerConfig, bridge: Arc<WorkerBridge>) -> Result<(), ConnectError> {
        if self.state != ConnectionState::Disconnected {
            tracing::debug!(state = ?self.state, "Connect ignored");
            return Ok(());
        }

        self.transition(ConnectionState::Connecting);
        let handle = match ConnectionHandle::open(
            Arc::clone(&self.driver),
            bridge,
            config.cluster_id,
            &config.address,
        ) {
            Ok(handle) => handle,
            Err(err) => {
                self.transition(ConnectionState::Disconnected);
                return Err(err);
            }
        };

        self.transition(ConnectionState::Registering);
        self.handle = Some(handle);
        self.transition(ConnectionState::Ready);
        Ok(())
    }

    /// Deinitialize the client if one is open. Returns whether anything changed.
    pub fn disconnect(&mut self) -> bool {
        if self.state == ConnectionState::Disconnected && self.handle.is_none() {
            return false;
        }
        // Mark first so completions fired during deinit are discarded.
        self.transition(ConnectionState::Disconnected);
        drop(self.handle.take());
        true
    }

    fn transition(&mut self, next: ConnectionState) {
        tracing::info!(from = self.state.label(), to = next.label(), "Connection state");
        self.state = next;
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state)
            .field("driver", &self.driver.name())
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::dispatch::Dispatcher;
    use crate::services::ledger::SimulatedLedger;

    fn bridge() -> Arc<WorkerBridge> {
        let (tx, _rx) = async_channel::unbounded();
        Arc::new(WorkerBridge::new(&LedgerConfig::default(), Dispatcher::new(tx)))
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let driver = Arc::new(SimulatedLedger::new());
        let mut connection = Connection::new(driver.clone());
        let config = LedgerConfig::default();

        connection.connect(&config, bridge()).unwrap();
        assert_eq!(connection.state(), ConnectionState::Ready);
        assert!(connection.can_submit());

        // second connect is a no-op
        connection.connect(&config, bridge()).unwrap();
        assert!(driver.is_running());

        assert!(connection.disconnect());
        assert!(!connection.disconnect());
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert!(!driver.is_running());
    }

    #[tokio::test]
    async fn test_failed_connect_returns_to_disconnected() {
        let mut connection = Connection::new(Arc::new(SimulatedLedger::new()));
        let config = LedgerConfig {
            address: "bogus".to_string(),
            ..LedgerConfig::default()
        };
        assert_eq!(connection.connect(&config, bridge()), Err(ConnectError::InvalidAddress));
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert!(connection.handle().is_none());
    }
}
