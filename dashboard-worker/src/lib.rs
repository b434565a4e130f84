//! Dashboard Worker - reference backend for the SOL trading dashboard
//!
//! Serves the REST contract the dashboard controller polls, from a
//! Cloudflare Worker.
//!
//! # Architecture
//! - Main entry point routes HTTP requests
//! - KV storage for persistent bot state (parameters, session, trades)
//! - Environment variables for wallet balance and defaults
//!
//! The worker records what the dashboard asks for and echoes the bot state
//! back. It does not trade.

#![allow(clippy::doc_markdown)] // Doc style flexibility
#![allow(clippy::needless_pass_by_value)] // Worker framework patterns
#![allow(clippy::map_unwrap_or)] // Explicit error handling preference

mod config;
mod error;
mod types;

use serde::de::DeserializeOwned;
use worker::{Context, Env, Request, Response, Router, console_log, console_warn, event};

pub use config::WorkerConfig;
pub use error::BackendError;
pub use types::*;

/// Result type alias for worker operations
type WResult<T> = std::result::Result<T, worker::Error>;

const STATE_KEY: &str = "bot_state";

/// Main Worker entry point
#[event(fetch)]
async fn fetch(req: Request, env: Env, _ctx: Context) -> WResult<Response> {
    console_error_panic_hook::set_once();

    let router = Router::new();

    router
        // Health check
        .get_async("/health", |_req, ctx| async move {
            let config = match WorkerConfig::from_env(&ctx.env) {
                Ok(c) => c,
                Err(e) => return Response::error(format!("Config error: {e}"), 500),
            };

            Response::from_json(&HealthResponse {
                status: "healthy".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                environment: config.environment,
                timestamp: chrono::Utc::now().to_rfc3339(),
            })
        })
        // Wallet balance
        .get_async("/api/get-balance", |_req, ctx| async move {
            let config = WorkerConfig::from_env(&ctx.env)?;
            Response::from_json(&BalanceResponse {
                balance: config.wallet_balance_sol,
            })
        })
        // Start (or keep polling) a trading session
        .post_async("/api/start-trading", |mut req, ctx| async move {
            let config = WorkerConfig::from_env(&ctx.env)?;
            let body: StartTradingRequest = match read_body(&mut req).await {
                Ok(b) => b,
                Err(e) => return invalid_body(&e),
            };
            if config.is_debug() {
                console_log!("start-trading body: {:?}", body);
            }
            let amount = body.amount.unwrap_or(config.default_trade_amount);

            let mut state = get_bot_state(&ctx.env).await?;
            if state.start(amount) {
                console_log!("Trading started with {} SOL", amount);
                save_bot_state(&ctx.env, &state).await?;
            }

            Response::from_json(&state.trading_update())
        })
        // Stop trading
        .post_async("/api/stop-trading", |_req, ctx| async move {
            let mut state = get_bot_state(&ctx.env).await?;
            if state.stop() {
                console_log!("Trading stopped");
                save_bot_state(&ctx.env, &state).await?;
            }

            Response::from_json(&StopTradingResponse {
                success: true,
                message: "Trading stopped successfully".to_string(),
                recent_trades: state.recent_trades,
            })
        })
        // Current token and session
        .get_async("/api/status", |_req, ctx| async move {
            let state = get_bot_state(&ctx.env).await?;
            Response::from_json(&state.status())
        })
        // Adaptive parameters
        .post_async("/api/update-parameters", |mut req, ctx| async move {
            let config = WorkerConfig::from_env(&ctx.env)?;
            let update: ParameterUpdate = match read_body(&mut req).await {
                Ok(u) => u,
                Err(e) => return invalid_body(&e),
            };
            if config.is_debug() {
                console_log!("update-parameters body: {:?}", update);
            }

            let mut state = get_bot_state(&ctx.env).await?;
            state.apply_parameters(&update, &chrono::Utc::now().to_rfc3339());
            save_bot_state(&ctx.env, &state).await?;

            let params = state.parameters;
            console_log!(
                "Parameters updated: threshold={} take={}% cut={}%",
                params.trending_threshold,
                params.profit_take_percentage,
                params.loss_cut_percentage
            );

            Response::from_json(&ParametersResponse {
                success: true,
                parameters: params,
            })
        })
        .run(req, env)
        .await
}

/// Read a JSON body. An empty body yields the defaults.
async fn read_body<T: DeserializeOwned + Default>(req: &mut Request) -> error::Result<T> {
    let text = req.text().await?;
    parse_body(&text)
}

/// 400 reply for a body that does not match the route's schema
fn invalid_body(err: &BackendError) -> WResult<Response> {
    let message = invalid_body_message(err);
    console_warn!("{}", message);
    Response::error(message, 400)
}

fn invalid_body_message(err: &BackendError) -> String {
    format!("Invalid request body: {err}")
}

fn parse_body<T: DeserializeOwned + Default>(text: &str) -> error::Result<T> {
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(text)?)
}

/// Get bot state from KV storage
async fn get_bot_state(env: &Env) -> error::Result<BotState> {
    let kv = env.kv("STATE")?;

    let state = kv
        .get(STATE_KEY)
        .json::<BotState>()
        .await
        .map_err(|e| BackendError::Storage(e.to_string()))?;
    Ok(state.unwrap_or_default())
}

/// Save bot state to KV storage
async fn save_bot_state(env: &Env, state: &BotState) -> error::Result<()> {
    let kv = env.kv("STATE")?;
    kv.put(STATE_KEY, state)
        .map_err(|e| BackendError::Storage(e.to_string()))?
        .execute()
        .await
        .map_err(|e| BackendError::Storage(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_uses_defaults() {
        let body: StartTradingRequest = parse_body("").expect("empty body");
        assert!(body.amount.is_none());

        let body: StartTradingRequest = parse_body("  \n").expect("blank body");
        assert!(body.amount.is_none());
    }

    #[test]
    fn test_body_with_amount() {
        let body: StartTradingRequest = parse_body(r#"{"amount": 0.25}"#).expect("valid body");
        assert_eq!(body.amount, Some(0.25));
    }

    #[test]
    fn test_malformed_body_is_json_error() {
        let err = parse_body::<ParameterUpdate>("{not json").unwrap_err();
        assert!(matches!(err, BackendError::Json(_)));
    }

    #[test]
    fn test_mistyped_parameters_are_rejected_not_dropped() {
        let err = parse_body::<ParameterUpdate>(r#"{"trending_threshold":"ten"}"#).unwrap_err();
        assert!(matches!(err, BackendError::Json(_)));

        let message = invalid_body_message(&err);
        assert!(message.starts_with("Invalid request body: JSON error:"), "{message}");
        assert!(message.contains("expected i64"), "{message}");
    }

    #[test]
    fn test_valid_partial_update_is_applied() {
        let update: ParameterUpdate =
            parse_body(r#"{"trending_threshold": 8}"#).expect("valid body");
        let mut state = BotState::default();
        state.apply_parameters(&update, "2024-01-01T00:00:00Z");
        assert_eq!(state.parameters.trending_threshold, 8);
    }
}
