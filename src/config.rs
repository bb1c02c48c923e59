//! Storefront configuration

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser};
use rusty_money::iso::Currency;

use crate::money::currency_from_code;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Clone, Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Wayfare storefront configuration
#[derive(Debug, Parser)]
#[command(name = "wayfare", about = "Wayfare ticket storefront", long_about = None)]
pub struct StorefrontConfig {
    /// ISO currency all prices are quoted in
    #[arg(
        short,
        long,
        env = "WAYFARE_CURRENCY",
        default_value = "IDR",
        value_parser = parse_currency
    )]
    pub currency: &'static Currency,

    /// Seconds a pending booking is shown as payable
    #[arg(long, env = "WAYFARE_PAYMENT_WINDOW_SECS", default_value_t = 900)]
    pub payment_window_secs: u64,

    /// Directory holding fixture sets
    #[arg(long, env = "WAYFARE_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Fixture set to load
    #[arg(long, env = "WAYFARE_FIXTURE_SET", default_value = "storefront")]
    pub fixture_set: String,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Payment window as a duration
    #[must_use]
    pub fn payment_window(&self) -> Duration {
        Duration::from_secs(self.payment_window_secs)
    }
}

fn parse_currency(code: &str) -> Result<&'static Currency, String> {
    currency_from_code(code).ok_or_else(|| format!("unsupported currency: {code}"))
}
