//! Dashboard controller - binds the view to the trading backend
//!
//! Owns the trading session and the two scheduled tasks (trading poll,
//! balance refresh). User actions arrive as [`Intent`]s; handlers log
//! failures and leave the view in its previous state.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tracing::{debug, error, info, warn};

use crate::backend::Backend;
use crate::config::{DashboardConfig, PollMode};
use crate::error::{DashboardError, Result};
use crate::format;
use crate::poller::ScheduledTask;
use crate::types::{Settings, StatusResponse, StopTradingResponse, TradeRecord, TradingUpdate};
use crate::view::{DARK_CLASS, DashboardView, ElementId, SharedView};

/// Confirmation shown after the backend accepts new parameters
pub const SETTINGS_SAVED_ALERT: &str = "Parameters updated successfully!";

/// Initial adaptive parameters shown in the settings inputs
const DEFAULT_THRESHOLD: &str = "5";
const DEFAULT_PROFIT_TAKE: &str = "20";
const DEFAULT_LOSS_CUT: &str = "10";

/// Trading session owned by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Idle,
    Trading {
        /// Trade amount in SOL sent with every poll
        amount: f64,
        started_at: DateTime<Utc>,
    },
}

/// A user action on the dashboard
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    ToggleTheme,
    StartTrading,
    StopTrading,
    SaveSettings,
    RefreshBalance,
    RefreshStatus,
    /// Type a value into an input element
    SetInput { id: ElementId, value: String },
}

impl Intent {
    /// Button that must be enabled for this intent to fire
    fn control(&self) -> Option<ElementId> {
        match self {
            Intent::ToggleTheme => Some(ElementId::ToggleTheme),
            Intent::StartTrading => Some(ElementId::StartTrading),
            Intent::StopTrading => Some(ElementId::StopTrading),
            Intent::SaveSettings => Some(ElementId::SaveSettings),
            Intent::RefreshBalance | Intent::RefreshStatus | Intent::SetInput { .. } => None,
        }
    }
}

pub struct DashboardController {
    backend: Arc<dyn Backend>,
    config: DashboardConfig,
    view: SharedView,
    session: SessionState,
    trading_poll: Option<ScheduledTask>,
    balance_refresh: Option<ScheduledTask>,
}

impl DashboardController {
    pub fn new(backend: Arc<dyn Backend>, config: DashboardConfig) -> Self {
        Self {
            backend,
            config,
            view: SharedView::default(),
            session: SessionState::Idle,
            trading_poll: None,
            balance_refresh: None,
        }
    }

    pub fn view(&self) -> &SharedView {
        &self.view
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn is_trading(&self) -> bool {
        matches!(self.session, SessionState::Trading { .. })
    }

    /// Render the initial page state and start the balance refresh
    pub fn initialize(&mut self) {
        let amount = self.config.default_trade_amount.to_string();
        self.view.update(|v| {
            render_status(v, None, 0.0, 0.0);
            v.set_value(ElementId::TradeAmount, amount);
            v.set_value(ElementId::ThresholdInput, DEFAULT_THRESHOLD);
            v.set_value(ElementId::ProfitTakeInput, DEFAULT_PROFIT_TAKE);
            v.set_value(ElementId::LossCutInput, DEFAULT_LOSS_CUT);
            set_trading_controls(v, false);
        });

        if self.balance_refresh.is_none() {
            let backend = self.backend.clone();
            let view = self.view.clone();
            let show_errors = self.config.show_balance_errors;
            self.balance_refresh = Some(ScheduledTask::at_fixed_rate(
                "balance-refresh",
                self.config.balance_refresh_interval,
                move |_| {
                    let backend = backend.clone();
                    let view = view.clone();
                    async move {
                        // Failures are already logged; the next tick retries.
                        let _ = refresh_balance_with(backend.as_ref(), &view, show_errors).await;
                    }
                },
            ));
        }

        info!(
            backend = self.config.backend_url.as_str(),
            "dashboard initialized"
        );
    }

    /// Dispatch a user action. Errors are logged, never returned.
    pub async fn dispatch(&mut self, intent: Intent) {
        if let Some(control) = intent.control() {
            if self.view.read(|v| v.is_disabled(control)) {
                debug!("ignoring {intent:?}: {control} is disabled");
                return;
            }
        }

        match intent {
            Intent::ToggleTheme => {
                self.toggle_theme();
            }
            Intent::StartTrading => match self.start_trading() {
                Ok(_) => {}
                Err(e @ DashboardError::InvalidInput { .. }) => {
                    warn!(field = ElementId::TradeAmount.as_str(), "Trading not started: {e}");
                }
                Err(e) => error!("Error starting trading: {e}"),
            },
            Intent::StopTrading => {
                if let Err(e) = self.stop_trading().await {
                    error!("Error stopping trading: {e}");
                }
            }
            Intent::SaveSettings => {
                if let Err(e) = self.save_settings().await {
                    error!("Error updating parameters: {e}");
                }
            }
            Intent::RefreshBalance => {
                // Logged inside
                let _ = self.refresh_balance().await;
            }
            Intent::RefreshStatus => {
                if let Err(e) = self.refresh_status().await {
                    error!("Error fetching status: {e}");
                }
            }
            Intent::SetInput { id, value } => {
                if let Err(e) = self.set_input(id, value) {
                    warn!("{e}");
                }
            }
        }
    }

    /// Flip the dark theme. Returns whether dark mode is now on.
    pub fn toggle_theme(&self) -> bool {
        self.view.update(|v| {
            let dark = v.toggle_body_class(DARK_CLASS);
            v.set_text(
                ElementId::ToggleTheme,
                if dark { "Light Mode" } else { "Dark Mode" },
            );
            dark
        })
    }

    pub fn set_input(&self, id: ElementId, value: String) -> Result<()> {
        if !id.is_input() {
            return Err(DashboardError::InvalidInput {
                field: id.as_str(),
                value,
            });
        }
        self.view.update(|v| v.set_value(id, value));
        Ok(())
    }

    /// Fetch the wallet balance once and render it
    pub async fn refresh_balance(&self) -> Result<f64> {
        refresh_balance_with(
            self.backend.as_ref(),
            &self.view,
            self.config.show_balance_errors,
        )
        .await
    }

    /// Fetch the bot status once and render it
    pub async fn refresh_status(&self) -> Result<StatusResponse> {
        let status = self.backend.status().await?;
        self.view.update(|v| render_status_snapshot(v, &status));
        Ok(status)
    }

    /// Start the trading session and its polling task.
    ///
    /// Returns `Ok(false)` when a session is already running.
    pub fn start_trading(&mut self) -> Result<bool> {
        if self.is_trading() {
            debug!("start requested while already trading");
            return Ok(false);
        }

        let raw = self.view.read(|v| v.value(ElementId::TradeAmount).to_string());
        let amount = parse_amount(&raw)?;
        info!(amount, mode = ?self.config.poll_mode, "Start trading");

        self.view.update(|v| set_trading_controls(v, true));
        self.session = SessionState::Trading {
            amount,
            started_at: Utc::now(),
        };
        self.trading_poll = Some(self.spawn_trading_poll(amount));
        Ok(true)
    }

    fn spawn_trading_poll(&self, amount: f64) -> ScheduledTask {
        let backend = self.backend.clone();
        let view = self.view.clone();
        let interval = self.config.poll_interval;

        match self.config.poll_mode {
            PollMode::Trading => {
                ScheduledTask::with_fixed_delay("trading-poll", interval, move |token| {
                    let backend = backend.clone();
                    let view = view.clone();
                    async move {
                        match backend.start_trading(amount).await {
                            Ok(update) if update.success => {
                                debug!(token = ?update.token, profit = update.profit, "trading update");
                                view.update(|v| {
                                    if !token.is_cancelled() {
                                        render_update(v, &update);
                                    }
                                });
                            }
                            Ok(update) => {
                                error!(
                                    "Error in backend response: {}",
                                    update.message.as_deref().unwrap_or("no message")
                                );
                            }
                            Err(e) => error!("Error communicating with backend: {e}"),
                        }
                    }
                })
            }
            PollMode::Status => ScheduledTask::with_fixed_delay("status-poll", interval, move |token| {
                let backend = backend.clone();
                let view = view.clone();
                async move {
                    match backend.status().await {
                        Ok(status) => view.update(|v| {
                            if !token.is_cancelled() {
                                render_status_snapshot(v, &status);
                            }
                        }),
                        Err(e) => error!("Error fetching status: {e}"),
                    }
                }
            }),
        }
    }

    /// End the trading session.
    ///
    /// The polling task is cancelled under the view lock, so no poll result
    /// is rendered once the controls have flipped back. When configured, the
    /// backend is told once that trading stopped.
    pub async fn stop_trading(&mut self) -> Result<Option<StopTradingResponse>> {
        let poll = self.trading_poll.take();
        self.view.update(|v| {
            if let Some(task) = &poll {
                task.cancel();
            }
            set_trading_controls(v, false);
        });
        if let Some(task) = poll {
            let ticks = task.stop().await;
            debug!(ticks, "trading poll stopped");
        }

        let was_trading = self.is_trading();
        self.session = SessionState::Idle;
        if !was_trading || !self.config.notify_backend_on_stop {
            return Ok(None);
        }

        let response = self.backend.stop_trading().await?;
        info!(
            recent_trades = response.recent_trades.len(),
            "Trading stopped: {}",
            response.message.as_deref().unwrap_or("ok")
        );
        Ok(Some(response))
    }

    /// Send the settings inputs to the backend.
    ///
    /// Returns whether the backend accepted them. Nothing is sent when an
    /// input does not parse.
    pub async fn save_settings(&self) -> Result<bool> {
        let settings = self.view.read(read_settings)?;
        info!(?settings, "Updating parameters");

        let response = self.backend.update_parameters(settings).await?;
        if response.success {
            self.view.update(|v| v.alert(SETTINGS_SAVED_ALERT));
        } else {
            warn!("backend rejected parameter update");
        }
        Ok(response.success)
    }

    /// Stop every scheduled task. The backend is not notified.
    pub async fn shutdown(&mut self) {
        if let Some(task) = self.trading_poll.take() {
            task.stop().await;
        }
        if let Some(task) = self.balance_refresh.take() {
            task.stop().await;
        }
        self.session = SessionState::Idle;
        info!("dashboard shut down");
    }
}

async fn refresh_balance_with(
    backend: &dyn Backend,
    view: &SharedView,
    show_errors: bool,
) -> Result<f64> {
    match backend.get_balance().await {
        Ok(balance) => {
            view.update(|v| v.set_text(ElementId::WalletBalance, format::balance(balance)));
            Ok(balance)
        }
        Err(e) => {
            warn!("Error fetching wallet balance: {e}");
            if show_errors {
                view.update(|v| v.set_text(ElementId::WalletBalance, format::BALANCE_ERROR_TEXT));
            }
            Err(e)
        }
    }
}

fn set_trading_controls(view: &mut DashboardView, trading: bool) {
    view.set_disabled(ElementId::StartTrading, trading);
    view.set_disabled(ElementId::StopTrading, !trading);
}

fn render_status(view: &mut DashboardView, token: Option<&str>, profit: f64, total: f64) {
    view.set_text(ElementId::CurrentToken, format::current_token(token));
    view.set_text(ElementId::ProfitLoss, format::profit_loss(profit));
    view.set_text(ElementId::TotalProfit, format::total_profit(total));
}

fn render_trades(view: &mut DashboardView, trades: &[TradeRecord]) {
    view.set_items(
        ElementId::TradesList,
        trades.iter().map(format::trade_line).collect(),
    );
}

fn render_update(view: &mut DashboardView, update: &TradingUpdate) {
    render_status(view, update.token.as_deref(), update.profit, update.total_profit);
    render_trades(view, &update.recent_trades);
    view.set_text(ElementId::LastUpdate, format::last_update(Local::now()));
}

fn render_status_snapshot(view: &mut DashboardView, status: &StatusResponse) {
    view.set_text(
        ElementId::CurrentToken,
        format::current_token(status.current_token.as_deref()),
    );
    view.set_text(ElementId::TokenBuys, format::token_buys(status.current_token_buys));
    view.set_text(ElementId::BuyPrice, format::buy_price(status.buy_price));
    view.set_text(ElementId::LastUpdate, format::last_update(Local::now()));
}

fn read_settings(view: &DashboardView) -> Result<Settings> {
    Ok(Settings {
        trending_threshold: parse_integer(
            ElementId::ThresholdInput,
            view.value(ElementId::ThresholdInput),
        )?,
        profit_take_percentage: parse_number(
            ElementId::ProfitTakeInput,
            view.value(ElementId::ProfitTakeInput),
        )?,
        loss_cut_percentage: parse_number(
            ElementId::LossCutInput,
            view.value(ElementId::LossCutInput),
        )?,
    })
}

fn invalid(field: ElementId, raw: &str) -> DashboardError {
    DashboardError::InvalidInput {
        field: field.as_str(),
        value: raw.to_string(),
    }
}

/// Finite number from an input field
fn parse_number(field: ElementId, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(field, raw))
}

fn parse_integer(field: ElementId, raw: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| invalid(field, raw))
}

/// Trade amount must be a positive number of SOL
fn parse_amount(raw: &str) -> Result<f64> {
    let amount = parse_number(ElementId::TradeAmount, raw)?;
    if amount <= 0.0 {
        return Err(invalid(ElementId::TradeAmount, raw));
    }
    Ok(amount)
}
