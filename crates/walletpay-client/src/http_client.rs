use serde::Serialize;
use walletpay::types::PaymentStatus;

use crate::wallet::{ClientError, WalletResult};

/// User-visible result of a payment submission. Always carries a message —
/// the user sees either a success with the returned status or the best
/// available error text, never a silent no-op.
#[derive(Debug, Clone)]
pub enum Outcome {
    Succeeded { status: PaymentStatus },
    Failed { message: String },
}

impl Outcome {
    pub fn message(&self) -> String {
        match self {
            Outcome::Succeeded { status } => {
                format!("Payment successful: {}", status.as_str())
            }
            Outcome::Failed { message } => format!("Payment failed: {message}"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<&'a str>,
    payment_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<&'a str>,
}

/// HTTP client for the walletpay backend.
pub struct PaymentApi {
    http: reqwest::Client,
    base_url: String,
}

impl PaymentApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client with a custom reqwest::Client.
    pub fn with_http_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Extract the token from the wallet result and submit one payment.
    ///
    /// Token extraction failures and transport failures return `Err`; a
    /// well-formed backend refusal returns `Ok(Outcome::Failed)` with the
    /// backend's error text.
    ///
    /// `request_id` drives the backend's idempotency key: a retry after a
    /// timeout must reuse the same id, otherwise the retry is a new charge.
    pub async fn submit_payment(
        &self,
        amount: i64,
        currency: Option<&str>,
        wallet_result: &WalletResult,
        description: Option<&str>,
        request_id: Option<&str>,
    ) -> Result<Outcome, ClientError> {
        let token = wallet_result.payment_token()?;

        let url = format!("{}/payment/create-payment", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&SubmitBody {
                amount,
                currency,
                payment_token: token,
                description,
                request_id,
            })
            .send()
            .await
            .map_err(|e| ClientError::Http(format!("payment request failed: {e}")))?;

        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::Http(format!("payment response read failed: {e}")))?;

        // Prefer the structured response; fall back to raw body text so a
        // malformed reply still produces a visible message.
        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(v) if v["success"] == true => {
                let status: PaymentStatus = v["paymentIntent"]["status"]
                    .as_str()
                    .unwrap_or("unknown")
                    .to_string()
                    .into();
                tracing::info!(status = %status.as_str(), "payment accepted");
                Ok(Outcome::Succeeded { status })
            }
            Ok(v) => {
                let message = v["error"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| body.clone());
                tracing::warn!(message = %message, "payment rejected");
                Ok(Outcome::Failed { message })
            }
            Err(_) => Ok(Outcome::Failed { message: body }),
        }
    }
}
