//! The trading backend as seen by the controller
//!
//! One method per REST endpoint. Methods return boxed futures so the
//! controller can hold any backend as `Arc<dyn Backend>` and move calls
//! into spawned tasks.

use futures::future::BoxFuture;

use crate::error::Result;
use crate::types::{Settings, SettingsResponse, StatusResponse, StopTradingResponse, TradingUpdate};

pub trait Backend: Send + Sync {
    /// GET /api/get-balance, in SOL
    fn get_balance(&self) -> BoxFuture<'_, Result<f64>>;

    /// POST /api/start-trading, issued on every polling tick
    fn start_trading(&self, amount: f64) -> BoxFuture<'_, Result<TradingUpdate>>;

    /// POST /api/stop-trading
    fn stop_trading(&self) -> BoxFuture<'_, Result<StopTradingResponse>>;

    /// GET /api/status
    fn status(&self) -> BoxFuture<'_, Result<StatusResponse>>;

    /// POST /api/update-parameters
    fn update_parameters(&self, settings: Settings) -> BoxFuture<'_, Result<SettingsResponse>>;
}
