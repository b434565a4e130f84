//! Configuration management for the dashboard controller

use std::time::Duration;

use crate::error::{DashboardError, Result};

/// Which backend request the polling task issues on each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// POST /api/start-trading and render profit + trade history
    Trading,
    /// GET /api/status and render token, buys and buy price
    Status,
}

impl PollMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "trading" => Some(Self::Trading),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// Dashboard controller configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the trading backend, without trailing slash
    pub backend_url: String,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Delay between two polling ticks while trading
    pub poll_interval: Duration,

    /// Period of the wallet balance refresh
    pub balance_refresh_interval: Duration,

    /// Per-request timeout for backend calls
    pub request_timeout: Duration,

    pub poll_mode: PollMode,

    /// Show "Error fetching balance" instead of keeping the stale value
    pub show_balance_errors: bool,

    /// Send POST /api/stop-trading when the stop control is used
    pub notify_backend_on_stop: bool,

    /// Initial value of the trade amount input (SOL)
    pub default_trade_amount: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8080".to_string(),
            log_level: "info".to_string(),
            poll_interval: Duration::from_millis(2000),
            balance_refresh_interval: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            poll_mode: PollMode::Trading,
            show_balance_errors: false,
            notify_backend_on_stop: true,
            default_trade_amount: 0.1,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            backend_url: lookup("DASHBOARD_BACKEND_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_url),

            log_level: lookup("DASHBOARD_LOG_LEVEL").unwrap_or(defaults.log_level),

            poll_interval: lookup("DASHBOARD_POLL_INTERVAL_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),

            balance_refresh_interval: lookup("DASHBOARD_BALANCE_REFRESH_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.balance_refresh_interval),

            request_timeout: lookup("DASHBOARD_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),

            poll_mode: lookup("DASHBOARD_POLL_MODE")
                .and_then(|v| PollMode::parse(&v))
                .unwrap_or(defaults.poll_mode),

            show_balance_errors: lookup("DASHBOARD_SHOW_BALANCE_ERRORS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.show_balance_errors),

            notify_backend_on_stop: lookup("DASHBOARD_NOTIFY_BACKEND_ON_STOP")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.notify_backend_on_stop),

            default_trade_amount: lookup("DASHBOARD_DEFAULT_TRADE_AMOUNT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_trade_amount),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(DashboardError::Config(format!(
                "backend_url must be http(s), got {}",
                self.backend_url
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(DashboardError::Config("poll_interval must be positive".into()));
        }
        if self.balance_refresh_interval.is_zero() {
            return Err(DashboardError::Config(
                "balance_refresh_interval must be positive".into(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(DashboardError::Config("request_timeout must be positive".into()));
        }
        if !self.default_trade_amount.is_finite() || self.default_trade_amount <= 0.0 {
            return Err(DashboardError::Config(
                "default_trade_amount must be a positive number".into(),
            ));
        }
        Ok(())
    }
}
