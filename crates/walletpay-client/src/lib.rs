//! Client SDK for submitting wallet payments to the walletpay backend.
//!
//! Device wallet plugins hand back differently shaped results depending on
//! the provider: Google Pay nests the token under
//! `paymentMethodData.tokenizationData`, other providers return it flat.
//! This crate normalizes those shapes into a [`WalletResult`] and forwards
//! the extracted token to the backend's create-payment endpoint.
//!
//! # Quick example
//!
//! ```no_run
//! use walletpay_client::{PaymentApi, WalletResult};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let wallet_json: serde_json::Value = serde_json::json!({
//!     "paymentMethodData": { "tokenizationData": { "token": "tok_abc" } }
//! });
//! let result = WalletResult::from_value(&wallet_json);
//!
//! let api = PaymentApi::new("http://localhost:4242");
//! let outcome = api
//!     .submit_payment(499, Some("usd"), &result, Some("Test purchase"), Some("order-42"))
//!     .await
//!     .unwrap();
//! println!("{}", outcome.message());
//! # }
//! ```

mod http_client;
mod wallet;

pub use http_client::{Outcome, PaymentApi};
pub use wallet::{ClientError, WalletResult};
