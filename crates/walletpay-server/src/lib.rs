//! walletpay server — creates and confirms payment intents from wallet tokens.
//!
//! The server exposes one authenticated-by-nothing-but-validation endpoint
//! for creating charges and one signature-verified webhook endpoint for
//! asynchronous status updates. Charge creation and signature verification
//! live in the core [`walletpay`] crate; this crate provides the HTTP
//! server, configuration, and metrics.
//!
//! # Modules
//!
//! - [`routes`] — HTTP endpoints (create-payment, webhook, health, metrics)
//! - [`state`] — Shared [`AppState`](state::AppState)
//! - [`config`] — Environment-driven [`ServerConfig`](config::ServerConfig)
//! - [`metrics`] — Prometheus metrics for payment and webhook operations

pub mod config;
pub mod metrics;
pub mod routes;
pub mod state;
