//! Configuration management for the inventory ledger service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with LEDGER_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::ReportThresholds;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Ledger source configuration
    pub ledger: LedgerConfig,

    /// Report thresholds
    pub report: ReportConfig,

    /// Log output configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LedgerConfig {
    /// Local ledger file or directory. `.xlsx` selects a workbook, `.json` a
    /// snapshot, anything else a directory of CSV files.
    pub path: Option<String>,

    /// Public spreadsheet CSV export URL; table names are appended to it
    pub sheet_url: Option<String>,

    /// Persist after every successful write
    pub auto_save: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Warn when budget utilization exceeds this percentage
    pub utilization_warning_percent: u32,

    /// Warn when items in stock fall below this count
    pub low_stock_threshold: u64,

    /// Default length of top-N rankings
    pub top_n: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable output
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("LEDGER_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("ledger.auto_save", true)?
            .set_default("report.utilization_warning_percent", 80)?
            .set_default("report.low_stock_threshold", 100)?
            .set_default("report.top_n", 5)?
            .set_default("logging.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (LEDGER_ prefix)
            .add_source(
                Environment::with_prefix("LEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl ReportConfig {
    pub fn thresholds(&self) -> ReportThresholds {
        ReportThresholds {
            utilization_warning_percent: Decimal::from(self.utilization_warning_percent),
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            utilization_warning_percent: 80,
            low_stock_threshold: 100,
            top_n: 5,
        }
    }
}
