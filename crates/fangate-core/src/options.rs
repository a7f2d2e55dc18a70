// MarketOptions — the engine's configuration surface.
//
// Options deserialize from camelCase JSON with per-field defaults, so a
// partial config file fills in the rest. Builder methods cover the settings
// embedders change most often.

use serde::{Deserialize, Serialize};

use crate::upload;

/// Top-level configuration for the marketplace engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOptions {
    /// Application name used in log output and notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Pricing and access-window configuration.
    #[serde(default)]
    pub pricing: PricingOptions,

    /// Upload gateway limits.
    #[serde(default)]
    pub upload: UploadOptions,

    /// Logger configuration.
    #[serde(default)]
    pub logger_config: LoggerOptions,
}

impl MarketOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Price stamped onto model accounts registered without one.
    pub fn default_monthly_price(mut self, price: i64) -> Self {
        self.pricing.default_monthly_price = price;
        self
    }

    /// Length of the access window granted on approval, in days.
    pub fn access_window_days(mut self, days: i64) -> Self {
        self.pricing.access_window_days = days;
        self
    }

    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.upload.max_file_bytes = bytes;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.logger_config.level = level.into();
        self
    }
}

// ─── Pricing Options ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingOptions {
    /// Monthly subscription price, in whole currency units, applied to
    /// model accounts that register without a price (default: 30).
    #[serde(default = "default_monthly_price")]
    pub default_monthly_price: i64,

    /// Days of access granted when a purchase is approved (default: 30).
    #[serde(default = "default_access_window_days")]
    pub access_window_days: i64,
}

fn default_monthly_price() -> i64 { 30 }
fn default_access_window_days() -> i64 { 30 }

impl Default for PricingOptions {
    fn default() -> Self {
        Self {
            default_monthly_price: default_monthly_price(),
            access_window_days: default_access_window_days(),
        }
    }
}

impl PricingOptions {
    /// The access window as a duration.
    pub fn access_window(&self) -> chrono::Duration {
        chrono::Duration::days(self.access_window_days)
    }
}

// ─── Upload Options ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    /// Maximum accepted file size in bytes (default: 50 MiB).
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Accepted media types.
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

fn default_max_file_bytes() -> u64 {
    upload::MAX_FILE_BYTES
}

fn default_allowed_types() -> Vec<String> {
    upload::ALLOWED_MEDIA_TYPES
        .iter()
        .map(|t| t.to_string())
        .collect()
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            allowed_types: default_allowed_types(),
        }
    }
}

// ─── Logger Options ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerOptions {
    /// Disable logging entirely.
    #[serde(default)]
    pub disabled: bool,

    /// Log level: "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            disabled: false,
            level: default_log_level(),
        }
    }
}
