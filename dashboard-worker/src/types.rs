//! Common types for the backend worker
//!
//! Persistent bot state plus the request/response bodies of the REST
//! contract the dashboard polls.

use serde::{Deserialize, Serialize};

/// Adaptive parameters tuned from the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Buys within `time_window` that mark a token as trending
    pub trending_threshold: i64,
    pub profit_take_percentage: f64,
    pub loss_cut_percentage: f64,
    /// Seconds
    pub time_window: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            trending_threshold: 5,
            profit_take_percentage: 20.0,
            loss_cut_percentage: 10.0,
            time_window: 30,
        }
    }
}

/// Body of POST /api/update-parameters. Absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterUpdate {
    #[serde(default)]
    pub trending_threshold: Option<i64>,
    #[serde(default)]
    pub profit_take_percentage: Option<f64>,
    #[serde(default)]
    pub loss_cut_percentage: Option<f64>,
}

impl ParameterUpdate {
    pub fn apply(&self, params: &mut Parameters) {
        if let Some(v) = self.trending_threshold {
            params.trending_threshold = v;
        }
        if let Some(v) = self.profit_take_percentage {
            params.profit_take_percentage = v;
        }
        if let Some(v) = self.loss_cut_percentage {
            params.loss_cut_percentage = v;
        }
    }
}

/// A recorded trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub action: String,
    pub token: String,
    pub price: f64,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit: Option<f64>,
}

/// Persistent bot state stored in KV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotState {
    #[serde(default)]
    pub parameters: Parameters,

    /// Realized profit (SOL)
    #[serde(default)]
    pub profit: f64,

    #[serde(default)]
    pub recent_trades: Vec<TradeRecord>,

    #[serde(default)]
    pub current_token: Option<String>,

    #[serde(default)]
    pub current_token_buys: u64,

    #[serde(default)]
    pub buy_price: Option<f64>,

    /// Set by start-trading, cleared by stop-trading
    #[serde(default)]
    pub trading_active: bool,

    /// Trade amount from the last start-trading call (SOL)
    #[serde(default)]
    pub trade_amount: Option<f64>,

    /// Last parameter change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for BotState {
    fn default() -> Self {
        Self {
            parameters: Parameters::default(),
            profit: 0.0,
            recent_trades: vec![],
            current_token: None,
            current_token_buys: 0,
            buy_price: None,
            trading_active: false,
            trade_amount: None,
            updated_at: None,
        }
    }
}

impl BotState {
    /// Mark trading active with `amount`. Returns whether anything changed.
    pub fn start(&mut self, amount: f64) -> bool {
        let changed = !self.trading_active || self.trade_amount != Some(amount);
        self.trading_active = true;
        self.trade_amount = Some(amount);
        changed
    }

    /// Mark trading inactive. Returns whether anything changed.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.trading_active, false)
    }

    pub fn apply_parameters(&mut self, update: &ParameterUpdate, now: &str) {
        update.apply(&mut self.parameters);
        self.updated_at = Some(now.to_string());
    }

    /// Reply to a start-trading poll
    pub fn trading_update(&self) -> TradingUpdate {
        TradingUpdate {
            success: true,
            token: self.current_token.clone(),
            profit: self.profit,
            total_profit: self.profit,
            recent_trades: self.recent_trades.clone(),
        }
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            current_token: self.current_token.clone(),
            current_token_buys: self.current_token_buys,
            buy_price: self.buy_price,
            trading_active: self.trading_active,
            profit: self.profit,
        }
    }
}

/// POST /api/start-trading body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartTradingRequest {
    #[serde(default)]
    pub amount: Option<f64>,
}

/// POST /api/start-trading reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingUpdate {
    pub success: bool,
    pub token: Option<String>,
    pub profit: f64,
    #[serde(rename = "totalProfit")]
    pub total_profit: f64,
    #[serde(rename = "recentTrades")]
    pub recent_trades: Vec<TradeRecord>,
}

/// POST /api/stop-trading reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopTradingResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "recentTrades")]
    pub recent_trades: Vec<TradeRecord>,
}

/// GET /api/status reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub current_token: Option<String>,
    pub current_token_buys: u64,
    pub buy_price: Option<f64>,
    pub trading_active: bool,
    pub profit: f64,
}

/// POST /api/update-parameters reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParametersResponse {
    pub success: bool,
    pub parameters: Parameters,
}

/// GET /api/get-balance reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: f64,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_parameter_update_keeps_other_fields() {
        let mut state = BotState::default();
        let update: ParameterUpdate =
            serde_json::from_str(r#"{"profit_take_percentage": 35}"#).expect("valid body");

        state.apply_parameters(&update, "2024-01-01T00:00:00Z");

        assert_eq!(state.parameters.trending_threshold, 5);
        assert!((state.parameters.profit_take_percentage - 35.0).abs() < f64::EPSILON);
        assert!((state.parameters.loss_cut_percentage - 10.0).abs() < f64::EPSILON);
        assert_eq!(state.parameters.time_window, 30);
        assert_eq!(state.updated_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_null_fields_are_treated_as_absent() {
        let update: ParameterUpdate =
            serde_json::from_str(r#"{"trending_threshold": null, "loss_cut_percentage": 4.5}"#)
                .expect("valid body");
        let mut params = Parameters::default();
        update.apply(&mut params);
        assert_eq!(params.trending_threshold, 5);
        assert!((params.loss_cut_percentage - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_start_and_stop_report_changes() {
        let mut state = BotState::default();
        assert!(state.start(0.1));
        assert!(!state.start(0.1));
        assert!(state.start(0.2));
        assert!(state.stop());
        assert!(!state.stop());
    }

    #[test]
    fn test_trading_update_wire_format() {
        let mut state = BotState::default();
        state.profit = 1.25;
        state.recent_trades.push(TradeRecord {
            action: "buy".to_string(),
            token: "MINT".to_string(),
            price: 0.5,
            time: "2024-01-01 10:00:00".to_string(),
            profit: None,
        });

        let json = serde_json::to_value(state.trading_update()).expect("serializable");
        assert_eq!(json["success"], true);
        assert!(json["token"].is_null());
        assert_eq!(json["totalProfit"], 1.25);
        assert_eq!(json["recentTrades"][0]["action"], "buy");
        assert!(json["recentTrades"][0].get("profit").is_none());
    }

    #[test]
    fn test_state_from_older_snapshot_fills_defaults() {
        let state: BotState =
            serde_json::from_str(r#"{"profit": 2.0, "current_token": "MINT"}"#).expect("valid");
        assert_eq!(state.parameters, Parameters::default());
        assert!(!state.trading_active);
        assert_eq!(state.status().current_token.as_deref(), Some("MINT"));
    }
}
