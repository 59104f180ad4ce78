//! Debug configuration from environment variables

use std::path::PathBuf;

pub(crate) const DEFAULT_FILTER: &str = "ledger_terminal=info,warn";

/// Debug system configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugConfig {
    /// Log directory (for rotation)
    pub log_dir: PathBuf,
    /// File name prefix of the rotated log
    pub log_file_name: String,
    /// Log level filter (e.g., "ledger_terminal=debug,info")
    pub log_level: String,
    /// Enable in-UI debug overlay
    pub show_debug_ui: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            log_file_name: "ledger-terminal.log".to_string(),
            log_level: DEFAULT_FILTER.to_string(),
            show_debug_ui: cfg!(feature = "debug-mode"),
        }
    }
}

impl DebugConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_dir: lookup("LEDGER_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            show_debug_ui: lookup("LEDGER_DEBUG_UI")
                .map(|v| v == "1")
                .unwrap_or(defaults.show_debug_ui),
            ..defaults
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(&self.log_file_name)
    }

    /// Check if debug logging is enabled
    pub fn is_debug_enabled(&self) -> bool {
        self.log_level.contains("debug") || self.log_level.contains("trace")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_lookup() {
        let config = DebugConfig::from_lookup(|key| match key {
            "LEDGER_LOG_DIR" => Some("/tmp/ledger-logs".to_string()),
            "RUST_LOG" => Some("ledger_terminal=debug".to_string()),
            _ => None,
        });
        assert_eq!(config.log_file(), PathBuf::from("/tmp/ledger-logs/ledger-terminal.log"));
        assert!(config.is_debug_enabled());
        assert!(!DebugConfig::default().is_debug_enabled());
    }
}
