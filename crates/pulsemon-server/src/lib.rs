//! REST server for the pulsemon metrics platform.
//!
//! Agents POST CPU/memory samples against their API key; dashboards read
//! targets, sample windows and fleet stats. All state lives in
//! [`pulsemon_storage::MetricStore`]; request handling is stateless.

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod state;
