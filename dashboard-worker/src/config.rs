//! Configuration management for the backend worker

use crate::error::{BackendError, Result};
use worker::Env;

/// Backend worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Environment (production, staging, development)
    pub environment: String,

    /// Log level
    pub log_level: String,

    /// Wallet balance reported by /api/get-balance (SOL)
    pub wallet_balance_sol: f64,

    /// Trade amount used when /api/start-trading has no amount (SOL)
    pub default_trade_amount: f64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            log_level: "info".to_string(),
            wallet_balance_sol: 10.0,
            default_trade_amount: 0.1,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from Cloudflare environment variables
    pub fn from_env(env: &Env) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            environment: env
                .var("ENVIRONMENT")
                .map_or(defaults.environment, |v| v.to_string()),

            log_level: env
                .var("LOG_LEVEL")
                .map_or(defaults.log_level, |v| v.to_string()),

            wallet_balance_sol: env
                .var("WALLET_BALANCE_SOL")
                .map(|v| v.to_string().parse().unwrap_or(defaults.wallet_balance_sol))
                .unwrap_or(defaults.wallet_balance_sol),

            default_trade_amount: env
                .var("DEFAULT_TRADE_AMOUNT")
                .map(|v| v.to_string().parse().unwrap_or(defaults.default_trade_amount))
                .unwrap_or(defaults.default_trade_amount),
        };
        config.validate()?;
        Ok(config)
    }

    /// Whether request bodies should be echoed to the console
    pub fn is_debug(&self) -> bool {
        self.log_level.eq_ignore_ascii_case("debug")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.wallet_balance_sol.is_finite() || self.wallet_balance_sol < 0.0 {
            return Err(BackendError::Config(
                "wallet_balance_sol must be a non-negative number".into(),
            ));
        }
        if !self.default_trade_amount.is_finite() || self.default_trade_amount <= 0.0 {
            return Err(BackendError::Config(
                "default_trade_amount must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_are_valid() {
        let config = WorkerConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.wallet_balance_sol - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        let config = WorkerConfig {
            default_trade_amount: 0.0,
            ..WorkerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_level() {
        assert!(!WorkerConfig::default().is_debug());
        let config = WorkerConfig {
            log_level: "DEBUG".to_string(),
            ..WorkerConfig::default()
        };
        assert!(config.is_debug());
    }
}
