//! # Service Configuration
//!
//! Layered configuration for the storefront API.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HORNADA_PORT=9000                                                  │
//! │     HORNADA_DB_PATH=/var/lib/hornada/hornada.db                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path> or HORNADA_CONFIG                                  │
//! │     ~/.config/hornada/storefront.toml (Linux)                          │
//! │     ~/Library/Application Support/com.hornada.storefront/... (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "./hornada.db"
//! max_connections = 5
//!
//! [store]
//! name = "Hornada"
//! currency_symbol = "$"
//! free_shipping_threshold_cents = 25000
//!
//! [checkout]
//! pickup_allowed = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use hornada_core::{CheckoutPolicy, Money};

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./hornada.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Discounted subtotal (cents) at which delivery becomes free.
    #[serde(default)]
    pub free_shipping_threshold_cents: Option<i64>,
}

fn default_store_name() -> String {
    "Hornada".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
            free_shipping_threshold_cents: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    #[serde(default = "default_pickup_allowed")]
    pub pickup_allowed: bool,
}

fn default_pickup_allowed() -> bool {
    true
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            pickup_allowed: default_pickup_allowed(),
        }
    }
}

// =============================================================================
// ApiConfig
// =============================================================================

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl ApiConfig {
    /// Loads configuration: defaults, then file, then environment.
    ///
    /// A missing file is not an error; an unreadable one is.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var("HORNADA_CONFIG").ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `HORNADA_*` overrides from `lookup`. Unparseable values are
    /// logged and skipped.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("HORNADA_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("HORNADA_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(value = %port, "Ignoring invalid HORNADA_PORT"),
            }
        }

        if let Some(path) = lookup("HORNADA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("HORNADA_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(m) => self.database.max_connections = m,
                Err(_) => warn!(value = %max, "Ignoring invalid HORNADA_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(name) = lookup("HORNADA_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(threshold) = lookup("HORNADA_FREE_SHIPPING_CENTS") {
            match threshold.parse::<i64>() {
                Ok(t) => self.store.free_shipping_threshold_cents = Some(t),
                Err(_) => warn!(value = %threshold, "Ignoring invalid HORNADA_FREE_SHIPPING_CENTS"),
            }
        }

        if let Some(pickup) = lookup("HORNADA_PICKUP_ALLOWED") {
            match pickup.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.checkout.pickup_allowed = true,
                "false" | "0" | "no" => self.checkout.pickup_allowed = false,
                _ => warn!(value = %pickup, "Ignoring invalid HORNADA_PICKUP_ALLOWED"),
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path is required".into()));
        }

        if self.store.free_shipping_threshold_cents.is_some_and(|t| t < 0) {
            return Err(ConfigError::Invalid(
                "store.free_shipping_threshold_cents must not be negative".into(),
            ));
        }

        Ok(())
    }

    /// `bind_addr:port`, ready for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }

    pub fn checkout_policy(&self) -> CheckoutPolicy {
        CheckoutPolicy {
            pickup_allowed: self.checkout.pickup_allowed,
            free_shipping_threshold: self
                .store
                .free_shipping_threshold_cents
                .map(Money::from_cents),
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "hornada", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
