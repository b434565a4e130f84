//! Wire types of the trading backend contract
//!
//! Field names follow the backend's JSON exactly; the camelCase ones
//! (`totalProfit`, `recentTrades`) are renamed explicitly.

use serde::{Deserialize, Serialize};

/// A trade reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// "buy" or "sell"
    pub action: String,
    pub token: String,
    pub price: f64,
    /// Backend-formatted timestamp, displayed verbatim
    pub time: String,
    /// Realized profit, present on sells only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit: Option<f64>,
}

/// GET /api/get-balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: f64,
}

/// POST /api/start-trading body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartTradingRequest {
    pub amount: f64,
}

/// POST /api/start-trading reply, one per polling tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingUpdate {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub profit: f64,
    #[serde(rename = "totalProfit", default)]
    pub total_profit: f64,
    #[serde(rename = "recentTrades", default)]
    pub recent_trades: Vec<TradeRecord>,
    /// Set by the backend when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// POST /api/stop-trading reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopTradingResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "recentTrades", default)]
    pub recent_trades: Vec<TradeRecord>,
}

/// GET /api/status reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub current_token: Option<String>,
    #[serde(default)]
    pub current_token_buys: u64,
    #[serde(default)]
    pub buy_price: Option<f64>,
}

/// Adaptive parameters sent to POST /api/update-parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Buys within the backend's time window that mark a token as trending
    pub trending_threshold: i64,
    pub profit_take_percentage: f64,
    pub loss_cut_percentage: f64,
}

/// POST /api/update-parameters reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    #[serde(default)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trading_update_camel_case_fields() {
        let json = r#"{
            "success": true,
            "token": "X",
            "profit": 1.5,
            "totalProfit": 3.25,
            "recentTrades": [
                {"action": "buy", "token": "X", "price": 0.5, "time": "2024-01-01 10:00:00"}
            ]
        }"#;

        let update: TradingUpdate = serde_json::from_str(json).expect("valid update");
        assert!(update.success);
        assert_eq!(update.token.as_deref(), Some("X"));
        assert!((update.total_profit - 3.25).abs() < f64::EPSILON);
        assert_eq!(update.recent_trades.len(), 1);
        assert!(update.recent_trades[0].profit.is_none());
    }

    #[test]
    fn test_trading_update_null_token() {
        let json = r#"{"success": true, "token": null, "profit": 0, "totalProfit": 0, "recentTrades": []}"#;
        let update: TradingUpdate = serde_json::from_str(json).expect("valid update");
        assert!(update.token.is_none());
    }

    #[test]
    fn test_failed_update_carries_message() {
        let json = r#"{"success": false, "message": "wallet locked"}"#;
        let update: TradingUpdate = serde_json::from_str(json).expect("valid update");
        assert!(!update.success);
        assert_eq!(update.message.as_deref(), Some("wallet locked"));
        assert!(update.recent_trades.is_empty());
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings {
            trending_threshold: 5,
            profit_take_percentage: 20.0,
            loss_cut_percentage: 10.0,
        };
        let json = serde_json::to_value(settings).expect("serializable");
        assert_eq!(json["trending_threshold"], 5);
        assert_eq!(json["profit_take_percentage"], 20.0);
        assert_eq!(json["loss_cut_percentage"], 10.0);
    }
}
