//! Display formatting for dashboard labels

use chrono::{DateTime, Local};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::TradeRecord;

/// Currency suffix for every amount shown on the dashboard
pub const CURRENCY: &str = "SOL";

/// Literal shown in the wallet label when the balance fetch fails
pub const BALANCE_ERROR_TEXT: &str = "Error fetching balance";

/// Two decimal places, exact ties rounded away from zero (`0.125` -> `0.13`).
///
/// Rounds the exact binary value, so `1.005` (stored just below the tie)
/// gives `1.00`.
pub fn to_fixed_2(value: f64) -> String {
    match Decimal::from_f64_retain(value) {
        Some(d) => {
            let mut rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(2);
            rounded.to_string()
        }
        // NaN, infinities and magnitudes beyond Decimal's range
        None => format!("{value:.2}"),
    }
}

pub fn current_token(token: Option<&str>) -> String {
    format!("Current Token: {}", token.unwrap_or("None"))
}

pub fn profit_loss(profit: f64) -> String {
    format!("Profit/Loss: {} {CURRENCY}", to_fixed_2(profit))
}

pub fn total_profit(total: f64) -> String {
    format!("Total Profit: {} {CURRENCY}", to_fixed_2(total))
}

/// Wallet balance in its shortest form (`10 SOL`, `10.5 SOL`)
pub fn balance(balance: f64) -> String {
    format!("{balance} {CURRENCY}")
}

pub fn token_buys(buys: u64) -> String {
    format!("Buys: {buys}")
}

pub fn buy_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("Buy Price: {} {CURRENCY}", to_fixed_2(p)),
        None => "Buy Price: --".to_string(),
    }
}

/// One line of the recent trades list
pub fn trade_line(trade: &TradeRecord) -> String {
    format!(
        "{} - Token: {}, Price: {} {CURRENCY} at {}",
        trade.action.to_uppercase(),
        trade.token,
        to_fixed_2(trade.price),
        trade.time
    )
}

pub fn last_update(at: DateTime<Local>) -> String {
    format!("Updated: {}", at.format("%H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        assert_eq!(current_token(Some("X")), "Current Token: X");
        assert_eq!(current_token(None), "Current Token: None");
        assert_eq!(profit_loss(1.5), "Profit/Loss: 1.50 SOL");
        assert_eq!(total_profit(3.25), "Total Profit: 3.25 SOL");
        assert_eq!(profit_loss(-0.125), "Profit/Loss: -0.13 SOL");
    }

    #[test]
    fn test_to_fixed_rounds_ties_away_from_zero() {
        assert_eq!(to_fixed_2(0.125), "0.13");
        assert_eq!(to_fixed_2(0.625), "0.63");
        assert_eq!(to_fixed_2(-0.125), "-0.13");
        assert_eq!(to_fixed_2(2.375), "2.38");
        assert_eq!(to_fixed_2(1.005), "1.00");
        assert_eq!(to_fixed_2(3.0), "3.00");
        assert_eq!(to_fixed_2(1.5), "1.50");
        assert_eq!(profit_loss(1.125), "Profit/Loss: 1.13 SOL");
        assert_eq!(buy_price(Some(0.625)), "Buy Price: 0.63 SOL");
    }

    #[test]
    fn test_balance_shortest_form() {
        assert_eq!(balance(10.0), "10 SOL");
        assert_eq!(balance(10.5), "10.5 SOL");
    }

    #[test]
    fn test_trade_line() {
        let trade = TradeRecord {
            action: "sell".to_string(),
            token: "T".to_string(),
            price: 1.125,
            time: "2024-01-01 10:00:00".to_string(),
            profit: Some(0.02),
        };
        assert_eq!(
            trade_line(&trade),
            "SELL - Token: T, Price: 1.13 SOL at 2024-01-01 10:00:00"
        );
    }

    #[test]
    fn test_status_variant_lines() {
        assert_eq!(token_buys(7), "Buys: 7");
        assert_eq!(buy_price(Some(0.5)), "Buy Price: 0.50 SOL");
        assert_eq!(buy_price(None), "Buy Price: --");
    }
}
