//! Addressable-element view of the dashboard
//!
//! Every element is reachable by the same id the dashboard page uses
//! (`current-token`, `start-trading`, ...). The controller only talks to
//! elements through these ids, so any front end that honours them (the
//! terminal one in `main.rs`, a browser binding) can sit on top.
//!
//! # Layout
//! - Status: current token, profit/loss, total profit, buys, buy price
//! - Wallet balance
//! - Controls: start/stop, trade amount, settings inputs, theme toggle
//! - Recent trades list

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

/// Body class toggled by the theme control
pub const DARK_CLASS: &str = "dark";

/// Ids of every addressable dashboard element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementId {
    CurrentToken,
    ProfitLoss,
    TotalProfit,
    TokenBuys,
    BuyPrice,
    WalletBalance,
    LastUpdate,
    StartTrading,
    StopTrading,
    TradeAmount,
    ThresholdInput,
    ProfitTakeInput,
    LossCutInput,
    SaveSettings,
    TradesList,
    ToggleTheme,
}

impl ElementId {
    pub const ALL: [ElementId; 16] = [
        ElementId::CurrentToken,
        ElementId::ProfitLoss,
        ElementId::TotalProfit,
        ElementId::TokenBuys,
        ElementId::BuyPrice,
        ElementId::WalletBalance,
        ElementId::LastUpdate,
        ElementId::StartTrading,
        ElementId::StopTrading,
        ElementId::TradeAmount,
        ElementId::ThresholdInput,
        ElementId::ProfitTakeInput,
        ElementId::LossCutInput,
        ElementId::SaveSettings,
        ElementId::TradesList,
        ElementId::ToggleTheme,
    ];

    /// The DOM id of this element
    pub fn as_str(self) -> &'static str {
        match self {
            ElementId::CurrentToken => "current-token",
            ElementId::ProfitLoss => "profit-loss",
            ElementId::TotalProfit => "total-profit",
            ElementId::TokenBuys => "token-buys",
            ElementId::BuyPrice => "buy-price",
            ElementId::WalletBalance => "wallet-balance",
            ElementId::LastUpdate => "last-update",
            ElementId::StartTrading => "start-trading",
            ElementId::StopTrading => "stop-trading",
            ElementId::TradeAmount => "trade-amount",
            ElementId::ThresholdInput => "threshold-input",
            ElementId::ProfitTakeInput => "profit-take-input",
            ElementId::LossCutInput => "loss-cut-input",
            ElementId::SaveSettings => "save-settings",
            ElementId::TradesList => "trades-list",
            ElementId::ToggleTheme => "toggle-theme",
        }
    }

    /// Whether the element accepts typed values
    pub fn is_input(self) -> bool {
        matches!(
            self,
            ElementId::TradeAmount
                | ElementId::ThresholdInput
                | ElementId::ProfitTakeInput
                | ElementId::LossCutInput
        )
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown element id: {s}"))
    }
}

/// State of one element: label text, input value, enablement, list items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub text: String,
    pub value: String,
    pub disabled: bool,
    pub items: Vec<String>,
}

/// The whole dashboard as plain data
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    elements: BTreeMap<ElementId, Element>,
    body_classes: BTreeSet<String>,
    alerts: Vec<String>,
}

impl DashboardView {
    /// A view matching the page as first loaded
    pub fn new() -> Self {
        let mut view = Self::default();
        for id in ElementId::ALL {
            view.elements.insert(id, Element::default());
        }
        view.set_text(ElementId::StartTrading, "Start Trading");
        view.set_text(ElementId::StopTrading, "Stop Trading");
        view.set_text(ElementId::SaveSettings, "Save Settings");
        view.set_text(ElementId::ToggleTheme, "Dark Mode");
        view.set_text(ElementId::WalletBalance, "--");
        view.set_disabled(ElementId::StopTrading, true);
        view
    }

    fn element_mut(&mut self, id: ElementId) -> &mut Element {
        self.elements.entry(id).or_default()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn text(&self, id: ElementId) -> &str {
        self.elements.get(&id).map_or("", |e| e.text.as_str())
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        self.element_mut(id).text = text.into();
    }

    pub fn value(&self, id: ElementId) -> &str {
        self.elements.get(&id).map_or("", |e| e.value.as_str())
    }

    pub fn set_value(&mut self, id: ElementId, value: impl Into<String>) {
        self.element_mut(id).value = value.into();
    }

    pub fn is_disabled(&self, id: ElementId) -> bool {
        self.elements.get(&id).is_some_and(|e| e.disabled)
    }

    pub fn set_disabled(&mut self, id: ElementId, disabled: bool) {
        self.element_mut(id).disabled = disabled;
    }

    pub fn items(&self, id: ElementId) -> &[String] {
        self.elements.get(&id).map_or(&[][..], |e| e.items.as_slice())
    }

    /// Replace the list contents; old items are cleared first
    pub fn set_items(&mut self, id: ElementId, items: Vec<String>) {
        self.element_mut(id).items = items;
    }

    pub fn has_body_class(&self, class: &str) -> bool {
        self.body_classes.contains(class)
    }

    /// Toggle a body class, returning whether it is now present
    pub fn toggle_body_class(&mut self, class: &str) -> bool {
        if self.body_classes.remove(class) {
            false
        } else {
            self.body_classes.insert(class.to_string());
            true
        }
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Remove and return alerts not yet shown to the user
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    /// Plain-text rendering for terminal front ends
    pub fn render(&self) -> String {
        let theme = if self.has_body_class(DARK_CLASS) { "dark" } else { "light" };
        let button = |id: ElementId| {
            if self.is_disabled(id) {
                format!("[{} (disabled)]", self.text(id))
            } else {
                format!("[{}]", self.text(id))
            }
        };

        let mut out = String::new();
        let _ = writeln!(out, "=== SOL Trading Dashboard ({theme}) ===");
        let _ = writeln!(out, "Wallet: {}", self.text(ElementId::WalletBalance));
        for id in [
            ElementId::CurrentToken,
            ElementId::ProfitLoss,
            ElementId::TotalProfit,
            ElementId::TokenBuys,
            ElementId::BuyPrice,
            ElementId::LastUpdate,
        ] {
            let text = self.text(id);
            if !text.is_empty() {
                let _ = writeln!(out, "{text}");
            }
        }
        let _ = writeln!(
            out,
            "{} {} {}",
            button(ElementId::StartTrading),
            button(ElementId::StopTrading),
            button(ElementId::ToggleTheme)
        );
        let _ = writeln!(
            out,
            "trade-amount={} threshold-input={} profit-take-input={} loss-cut-input={}",
            self.value(ElementId::TradeAmount),
            self.value(ElementId::ThresholdInput),
            self.value(ElementId::ProfitTakeInput),
            self.value(ElementId::LossCutInput)
        );
        let _ = writeln!(out, "--- Recent Trades ---");
        let trades = self.items(ElementId::TradesList);
        if trades.is_empty() {
            let _ = writeln!(out, "None");
        }
        for line in trades {
            let _ = writeln!(out, "  {line}");
        }
        out
    }
}

/// Thread-safe handle on the view that announces every change.
///
/// Each `update` bumps a version on a watch channel so a front end can
/// redraw without polling the view itself.
#[derive(Debug, Clone)]
pub struct SharedView {
    inner: Arc<Mutex<DashboardView>>,
    changes: Arc<watch::Sender<u64>>,
}

impl SharedView {
    pub fn new(view: DashboardView) -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            inner: Arc::new(Mutex::new(view)),
            changes: Arc::new(tx),
        }
    }

    /// Mutate the view under its lock and notify subscribers
    pub fn update<R>(&self, f: impl FnOnce(&mut DashboardView) -> R) -> R {
        let result = {
            let mut view = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut view)
        };
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
        result
    }

    /// Read the view under its lock
    pub fn read<R>(&self, f: impl FnOnce(&DashboardView) -> R) -> R {
        let view = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&view)
    }

    /// Drain pending alerts. Not announced as a change.
    pub fn take_alerts(&self) -> Vec<String> {
        let mut view = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        view.take_alerts()
    }

    pub fn snapshot(&self) -> DashboardView {
        self.read(Clone::clone)
    }

    /// Receiver that wakes on every change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

impl Default for SharedView {
    fn default() -> Self {
        Self::new(DashboardView::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ids_round_trip_through_dom_names() {
        for id in ElementId::ALL {
            assert_eq!(id.as_str().parse::<ElementId>(), Ok(id));
        }
        assert!("no-such-element".parse::<ElementId>().is_err());
    }

    #[test]
    fn test_initial_view() {
        let view = DashboardView::new();
        assert!(!view.is_disabled(ElementId::StartTrading));
        assert!(view.is_disabled(ElementId::StopTrading));
        assert_eq!(view.text(ElementId::ToggleTheme), "Dark Mode");
        assert!(!view.has_body_class(DARK_CLASS));
    }

    #[test]
    fn test_toggle_body_class() {
        let mut view = DashboardView::new();
        assert!(view.toggle_body_class(DARK_CLASS));
        assert!(view.has_body_class(DARK_CLASS));
        assert!(!view.toggle_body_class(DARK_CLASS));
        assert!(!view.has_body_class(DARK_CLASS));
    }

    #[test]
    fn test_set_items_replaces_list() {
        let mut view = DashboardView::new();
        view.set_items(ElementId::TradesList, vec!["a".into(), "b".into()]);
        view.set_items(ElementId::TradesList, vec!["c".into()]);
        assert_eq!(view.items(ElementId::TradesList).to_vec(), vec!["c".to_string()]);
    }

    #[test]
    fn test_take_alerts_drains() {
        let mut view = DashboardView::new();
        view.alert("one");
        assert_eq!(view.take_alerts(), vec!["one".to_string()]);
        assert!(view.alerts().is_empty());
    }

    #[test]
    fn test_render_lists_trades_and_disabled_buttons() {
        let mut view = DashboardView::new();
        view.set_text(ElementId::CurrentToken, "Current Token: X");
        view.set_items(ElementId::TradesList, vec!["BUY - Token: X".into()]);
        let text = view.render();
        assert!(text.contains("Current Token: X"));
        assert!(text.contains("  BUY - Token: X"));
        assert!(text.contains("[Stop Trading (disabled)]"));
    }

    #[tokio::test]
    async fn test_shared_view_notifies_on_update() {
        let shared = SharedView::default();
        let mut rx = shared.subscribe();
        shared.update(|v| v.set_text(ElementId::WalletBalance, "10 SOL"));
        rx.changed().await.expect("sender alive");
        assert_eq!(shared.read(|v| v.text(ElementId::WalletBalance).to_string()), "10 SOL");
    }
}
