//! Outbound client for the external payment processor.
//!
//! One invocation makes exactly one create-and-confirm call: the opaque
//! wallet token becomes a card payment method, confirmation is requested
//! immediately, and the processor's intent object is relayed verbatim.
//! There is no retry loop here; the idempotency key makes a caller-driven
//! retry safe instead.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::PaymentError;
use crate::types::{PaymentIntent, PaymentRequest};

/// Default base URL of the processor API. Overridable for tests and mocks.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Request timeout for the create-and-confirm call, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// A validated charge, ready to send to the processor.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: i64,
    pub currency: String,
    pub token: String,
    pub description: Option<String>,
    /// Sent as the `Idempotency-Key` header so a retried request cannot
    /// create a second charge.
    pub idempotency_key: String,
}

impl ChargeRequest {
    /// Validate an inbound [`PaymentRequest`] and fill defaults.
    ///
    /// Fails fast with [`PaymentError::Validation`] before any external call
    /// when the amount is not positive or the token is empty.
    pub fn from_request(
        req: &PaymentRequest,
        default_currency: &str,
    ) -> Result<Self, PaymentError> {
        if req.amount <= 0 || req.payment_token.is_empty() {
            return Err(PaymentError::Validation(
                "amount and paymentToken required".to_string(),
            ));
        }

        let idempotency_key = match &req.request_id {
            Some(id) => format!("walletpay-{id}"),
            None => uuid::Uuid::new_v4().to_string(),
        };

        Ok(Self {
            amount: req.amount,
            currency: req
                .currency
                .clone()
                .unwrap_or_else(|| default_currency.to_string()),
            token: req.payment_token.clone(),
            description: req.description.clone(),
            idempotency_key,
        })
    }
}

/// Processor-side charge creation, behind a trait so the HTTP layer can be
/// tested against a stub without touching the network.
pub trait ProcessorClient: Send + Sync {
    /// Create and immediately confirm a payment intent from a wallet token.
    fn create_and_confirm<'a>(
        &'a self,
        charge: &'a ChargeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PaymentIntent, PaymentError>> + Send + 'a>>;
}

/// Stripe-backed [`ProcessorClient`].
pub struct StripeProcessor {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeProcessor {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }

    async fn create_and_confirm_inner(
        &self,
        charge: &ChargeRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/v1/payment_intents", self.api_base);
        let amount = charge.amount.to_string();

        let mut form: Vec<(&str, &str)> = vec![
            ("amount", &amount),
            ("currency", &charge.currency),
            ("confirm", "true"),
            ("payment_method_data[type]", "card"),
            ("payment_method_data[card][token]", &charge.token),
        ];
        if let Some(ref desc) = charge.description {
            form.push(("description", desc));
        }

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", &charge.idempotency_key)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PaymentError::Timeout(REQUEST_TIMEOUT_SECS)
                } else {
                    PaymentError::Http(format!("processor request failed: {e}"))
                }
            })?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| PaymentError::Http(format!("processor response read failed: {e}")))?;

        if !status.is_success() {
            return Err(PaymentError::Processor(extract_error_message(
                &body,
                status.as_u16(),
            )));
        }

        let intent: PaymentIntent = serde_json::from_slice(&body)?;
        tracing::debug!(
            intent = %intent.id,
            status = %intent.status.as_str(),
            "create-and-confirm call completed"
        );
        Ok(intent)
    }
}

impl ProcessorClient for StripeProcessor {
    fn create_and_confirm<'a>(
        &'a self,
        charge: &'a ChargeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PaymentIntent, PaymentError>> + Send + 'a>> {
        Box::pin(self.create_and_confirm_inner(charge))
    }
}

/// Pull the best available message out of a processor error body.
///
/// The API returns structured detail either as a top-level `message` or
/// nested under `error.message`; fall back to the HTTP status when neither
/// is present or the body is not JSON.
fn extract_error_message(body: &[u8], status: u16) -> String {
    if let Ok(v) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
    }
    format!("processor returned HTTP {status}")
}
