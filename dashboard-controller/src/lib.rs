//! Dashboard Controller - front end for a SOL trading backend
//!
//! Binds an addressable-element dashboard to the backend's REST API.
//!
//! # Architecture
//! - `view`: element ids and the shared, change-notifying view model
//! - `client`: HTTP implementation of the `Backend` trait
//! - `poller`: cancellable fixed-delay / fixed-rate tasks
//! - `controller`: trading session, intents, rendering
//!
//! # Features
//! - Start/stop trading with a 2-second polling loop that stop pre-empts
//! - Wallet balance refresh every 10 seconds
//! - Adaptive parameter updates with input validation
//! - Light/dark theme toggle

#![allow(clippy::doc_markdown)] // Doc style flexibility

pub mod backend;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod poller;
pub mod types;
pub mod view;

pub use backend::Backend;
pub use client::HttpBackend;
pub use config::{DashboardConfig, PollMode};
pub use controller::{DashboardController, Intent, SessionState};
pub use error::{DashboardError, Result};
pub use poller::ScheduledTask;
pub use types::*;
pub use view::{DashboardView, ElementId, SharedView};
