//! # Ledger Configuration
//!
//! Connection and pacing settings, loaded from `./ledger-terminal.json` when it
//! exists and then overridden from the environment:
//!
//! - `LEDGER_ADDRESS`: replica address list (default `3000`)
//! - `LEDGER_CLUSTER_ID`: cluster id (default `0`)
//! - `LEDGER_POOL_CAPACITY`: request slots (default `8`)
//! - `LEDGER_WATCHDOG_MS`: request timeout in milliseconds (default `5000`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};
use crate::services::ledger::DEFAULT_POOL_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub address: String,
    pub cluster_id: u128,
    pub pool_capacity: usize,
    /// Minimum time between a completion callback and the next submission.
    pub min_gap_ms: u64,
    /// Delay before a rate-limited submission is retried.
    pub settle_delay_ms: u64,
    pub watchdog_timeout_ms: u64,
    pub ledger: u32,
    pub account_code: u16,
    pub transfer_code: u16,
    /// Most accounts requested per query.
    pub query_limit: u32,
    /// Most transfers requested per account.
    pub transfer_limit: u32,
    /// Decimal places shown for amounts.
    pub amount_scale: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            address: "3000".to_string(),
            cluster_id: 0,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            min_gap_ms: 100,
            settle_delay_ms: 50,
            watchdog_timeout_ms: 5_000,
            ledger: 1,
            account_code: 1,
            transfer_code: 1,
            query_limit: 128,
            transfer_limit: 256,
            amount_scale: 2,
        }
    }
}

impl LedgerConfig {
    pub fn config_path() -> PathBuf {
        PathBuf::from("./ledger-terminal.json")
    }

    /// File (if any) plus environment overrides. Never fails; problems are logged.
    pub fn load() -> Self {
        let path = Self::config_path();
        let mut config = if path.exists() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded ledger configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to load ledger config from {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `LEDGER_*` overrides, looking each key up with `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup("LEDGER_ADDRESS").filter(|a| !a.trim().is_empty()) {
            self.address = address.trim().to_string();
        }
        override_parsed(&lookup, "LEDGER_CLUSTER_ID", &mut self.cluster_id);
        override_parsed(&lookup, "LEDGER_POOL_CAPACITY", &mut self.pool_capacity);
        override_parsed(&lookup, "LEDGER_WATCHDOG_MS", &mut self.watchdog_timeout_ms);
        self.pool_capacity = self.pool_capacity.max(1);
    }

    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(AppError::Config("address must not be empty".to_string()));
        }
        if self.pool_capacity == 0 {
            return Err(AppError::Config("pool_capacity must be at least 1".to_string()));
        }
        if self.ledger == 0 || self.account_code == 0 || self.transfer_code == 0 {
            return Err(AppError::Config("ledger and codes must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn min_gap(&self) -> Duration {
        Duration::from_millis(self.min_gap_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_millis(self.watchdog_timeout_ms)
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(key, value = %raw, "Ignoring unparsable override"),
    }
}
