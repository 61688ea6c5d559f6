//! # Store Settings
//!
//! Thresholds and startup options for the `godown` store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     GODOWN_LOW_STOCK_THRESHOLD=80                                       │
//! │     GODOWN_DATABASE_PATH=./godown.db                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/godown/godown.toml (Linux)                                │
//! │     ~/Library/Application Support/com.godown.inventory/godown.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     in-memory store, demo data, thresholds 100 / 150, 30 days           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # godown.toml
//! [store]
//! database_path = "./godown.db"   # omit for an in-memory store
//! seed_demo_data = true
//!
//! [alerts]
//! low_stock_threshold = 100
//! alert_stock_threshold = 150
//! expiry_window_days = 30
//! recent_orders_limit = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use godown_core::{
    DEFAULT_ALERT_STOCK_THRESHOLD, DEFAULT_EXPIRY_WINDOW_DAYS, DEFAULT_LOW_STOCK_THRESHOLD,
    DEFAULT_RECENT_ORDERS_LIMIT, MAX_EXPIRY_WINDOW_DAYS,
};

use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;

// =============================================================================
// Sections
// =============================================================================

/// Where the store lives and what it starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSection {
    /// File-backed store path. `None` keeps everything in memory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Load the demonstration data set into an empty store on open.
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            database_path: None,
            seed_demo_data: true,
        }
    }
}

/// Report thresholds shared by the dashboard and alerts page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSection {
    /// Dashboard low-stock cut-off (strictly below).
    #[serde(default = "default_low_stock")]
    pub low_stock_threshold: i64,

    /// Alerts page low-stock cut-off (strictly below).
    #[serde(default = "default_alert_stock")]
    pub alert_stock_threshold: i64,

    /// Days ahead to look for expiring stock.
    #[serde(default = "default_expiry_window")]
    pub expiry_window_days: i64,

    /// Orders shown in the recent orders panel.
    #[serde(default = "default_recent_orders")]
    pub recent_orders_limit: u32,
}

fn default_true() -> bool {
    true
}
fn default_low_stock() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}
fn default_alert_stock() -> i64 {
    DEFAULT_ALERT_STOCK_THRESHOLD
}
fn default_expiry_window() -> i64 {
    DEFAULT_EXPIRY_WINDOW_DAYS
}
fn default_recent_orders() -> u32 {
    DEFAULT_RECENT_ORDERS_LIMIT
}

impl Default for AlertSection {
    fn default() -> Self {
        AlertSection {
            low_stock_threshold: default_low_stock(),
            alert_stock_threshold: default_alert_stock(),
            expiry_window_days: default_expiry_window(),
            recent_orders_limit: default_recent_orders(),
        }
    }
}

// =============================================================================
// Store Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub alerts: AlertSection,
}

impl StoreSettings {
    /// Loads settings from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Settings file (godown.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
        let mut settings = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store settings from file");
                settings = Self::from_file(&path)?;
            } else {
                debug!(?path, "Settings file not found, using defaults");
            }
        }

        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    /// Loads settings or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load store settings: {}. Using defaults.", e);
            Self::default()
        })
    }

    fn from_file(path: &Path) -> DbResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parses settings from TOML text. Missing keys take their defaults.
    pub fn from_toml(contents: &str) -> DbResult<Self> {
        toml::from_str(contents).map_err(|e| DbError::InvalidSettings(e.to_string()))
    }

    /// Validates the settings.
    pub fn validate(&self) -> DbResult<()> {
        let alerts = &self.alerts;

        if alerts.low_stock_threshold < 0 || alerts.alert_stock_threshold < 0 {
            return Err(DbError::InvalidSettings(
                "stock thresholds cannot be negative".into(),
            ));
        }

        if alerts.expiry_window_days < 0 {
            return Err(DbError::InvalidSettings(
                "expiry_window_days cannot be negative".into(),
            ));
        }

        if alerts.expiry_window_days > MAX_EXPIRY_WINDOW_DAYS {
            return Err(DbError::InvalidSettings(format!(
                "expiry_window_days cannot exceed {MAX_EXPIRY_WINDOW_DAYS}"
            )));
        }

        if alerts.recent_orders_limit == 0 {
            return Err(DbError::InvalidSettings(
                "recent_orders_limit must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `GODOWN_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("GODOWN_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.store.database_path = match path.trim() {
                "" | ":memory:" => None,
                p => Some(PathBuf::from(p)),
            };
        }

        if let Some(seed) = lookup("GODOWN_SEED_DEMO_DATA") {
            match seed.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.store.seed_demo_data = true,
                "0" | "false" | "no" => self.store.seed_demo_data = false,
                _ => warn!(value = %seed, "Unknown GODOWN_SEED_DEMO_DATA value in environment"),
            }
        }

        override_number(&lookup, "GODOWN_LOW_STOCK_THRESHOLD", &mut self.alerts.low_stock_threshold);
        override_number(&lookup, "GODOWN_ALERT_STOCK_THRESHOLD", &mut self.alerts.alert_stock_threshold);
        override_number(&lookup, "GODOWN_EXPIRY_WINDOW_DAYS", &mut self.alerts.expiry_window_days);
        override_number(&lookup, "GODOWN_RECENT_ORDERS_LIMIT", &mut self.alerts.recent_orders_limit);
    }

    /// Returns the default settings file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "godown", "inventory")
            .map(|dirs| dirs.config_dir().join("godown.toml"))
    }

    /// Store connection config for these settings.
    pub fn db_config(&self) -> DbConfig {
        let config = match &self.store.database_path {
            Some(path) => DbConfig::new(path),
            None => DbConfig::in_memory(),
        };
        config.seed_demo_data(self.store.seed_demo_data)
    }
}

fn override_number<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => {
            debug!(key, value = %value, "Overriding setting from environment");
            *target = value;
        }
        Err(_) => warn!(key, value = %raw, "Ignoring unparseable setting in environment"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = StoreSettings::default();
        assert_eq!(settings.alerts.low_stock_threshold, 100);
        assert_eq!(settings.alerts.alert_stock_threshold, 150);
        assert_eq!(settings.alerts.expiry_window_days, 30);
        assert_eq!(settings.alerts.recent_orders_limit, 10);
        assert!(settings.store.seed_demo_data);
        assert!(settings.store.database_path.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = StoreSettings::from_toml(
            r#"
            [alerts]
            low_stock_threshold = 80
            "#,
        )
        .unwrap();

        assert_eq!(settings.alerts.low_stock_threshold, 80);
        assert_eq!(settings.alerts.expiry_window_days, 30);
        assert!(settings.store.seed_demo_data);
    }

    #[test]
    fn test_bad_toml_is_invalid_settings() {
        let err = StoreSettings::from_toml("[alerts]\nlow_stock_threshold = \"lots\"").unwrap_err();
        assert!(matches!(err, DbError::InvalidSettings(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("GODOWN_LOW_STOCK_THRESHOLD", "25"),
            ("GODOWN_EXPIRY_WINDOW_DAYS", "not-a-number"),
            ("GODOWN_SEED_DEMO_DATA", "false"),
            ("GODOWN_DATABASE_PATH", "/tmp/godown.db"),
        ]
        .into_iter()
        .collect();

        let mut settings = StoreSettings::default();
        settings.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.alerts.low_stock_threshold, 25);
        assert_eq!(settings.alerts.expiry_window_days, 30);
        assert!(!settings.store.seed_demo_data);
        assert_eq!(
            settings.store.database_path,
            Some(PathBuf::from("/tmp/godown.db"))
        );
    }

    #[test]
    fn test_validate_rejects_negative_thresholds() {
        let mut settings = StoreSettings::default();
        settings.alerts.expiry_window_days = -1;
        assert!(settings.validate().is_err());

        let mut settings = StoreSettings::default();
        settings.alerts.recent_orders_limit = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_caps_expiry_window() {
        let mut settings = StoreSettings::default();
        settings.apply_overrides(|key| {
            (key == "GODOWN_EXPIRY_WINDOW_DAYS").then(|| "200000000".to_string())
        });
        assert_eq!(settings.alerts.expiry_window_days, 200_000_000);

        let err = settings.validate().unwrap_err();
        assert!(matches!(err, DbError::InvalidSettings(ref msg) if msg.contains("36500")));

        settings.alerts.expiry_window_days = MAX_EXPIRY_WINDOW_DAYS;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_db_config_follows_settings() {
        let mut settings = StoreSettings::default();
        assert!(settings.db_config().is_in_memory());

        settings.store.database_path = Some(PathBuf::from("./godown.db"));
        settings.store.seed_demo_data = false;
        let config = settings.db_config();
        assert!(!config.is_in_memory());
        assert!(!config.seed_demo_data);
    }
}
