//! HTTP client for the trading backend
//!
//! Implements the backend REST contract:
//! - Wallet balance
//! - Start/stop trading and the per-tick trading update
//! - Bot status
//! - Adaptive parameter updates

use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::types::{
    BalanceResponse, Settings, SettingsResponse, StartTradingRequest, StatusResponse,
    StopTradingResponse, TradingUpdate,
};

/// Trading backend client over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Self::new(config.backend_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get wallet balance in SOL
    pub async fn fetch_balance(&self) -> Result<f64> {
        let response: BalanceResponse = self.get("/api/get-balance").await?;
        Ok(response.balance)
    }

    /// Run one trading tick for `amount` SOL
    pub async fn fetch_trading_update(&self, amount: f64) -> Result<TradingUpdate> {
        self.post("/api/start-trading", &StartTradingRequest { amount })
            .await
    }

    pub async fn send_stop(&self) -> Result<StopTradingResponse> {
        let url = format!("{}/api/stop-trading", self.base_url);
        let response = self.client.post(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn fetch_status(&self) -> Result<StatusResponse> {
        self.get("/api/status").await
    }

    pub async fn send_parameters(&self, settings: Settings) -> Result<SettingsResponse> {
        self.post("/api/update-parameters", &settings).await
    }

    /// Perform GET request
    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Perform POST request with a JSON body
    async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);

        let response = self.client.post(&url).json(body).send().await?;

        Self::handle_response(response).await
    }

    /// Handle API response, checking for errors
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Err(DashboardError::RateLimit(retry_after));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(DashboardError::Backend(format!("HTTP {status}: {error_text}")));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(DashboardError::from)
    }
}

impl Backend for HttpBackend {
    fn get_balance(&self) -> BoxFuture<'_, Result<f64>> {
        self.fetch_balance().boxed()
    }

    fn start_trading(&self, amount: f64) -> BoxFuture<'_, Result<TradingUpdate>> {
        self.fetch_trading_update(amount).boxed()
    }

    fn stop_trading(&self) -> BoxFuture<'_, Result<StopTradingResponse>> {
        self.send_stop().boxed()
    }

    fn status(&self) -> BoxFuture<'_, Result<StatusResponse>> {
        self.fetch_status().boxed()
    }

    fn update_parameters(&self, settings: Settings) -> BoxFuture<'_, Result<SettingsResponse>> {
        self.send_parameters(settings).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpBackend::new("http://localhost:8080/", Duration::from_secs(1))
            .expect("client builds");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_start_request_serialization() {
        let json = serde_json::to_string(&StartTradingRequest { amount: 0.25 })
            .expect("request serialization should succeed");
        assert_eq!(json, r#"{"amount":0.25}"#);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        // Port 9 (discard) is closed on test hosts; connection is refused.
        let client = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(2))
            .expect("client builds");
        let err = client.fetch_balance().await.unwrap_err();
        assert!(matches!(err, DashboardError::Http(_)));
    }
}
