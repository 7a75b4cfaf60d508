use serde::{Deserialize, Serialize};

/// Inbound body for `POST /payment/create-payment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Amount in minor currency units (e.g. cents). Must be positive.
    pub amount: i64,
    /// Three-letter currency code; defaults server-side when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Opaque token from the device wallet, redeemable once.
    pub payment_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Client-supplied request id; drives the idempotency key so a retried
    /// submission cannot double-charge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Processor-side lifecycle state of a single charge attempt.
///
/// Unknown states pass through verbatim so a new processor status does not
/// break deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    RequiresAction,
    Succeeded,
    Failed,
    Processing,
    Other(String),
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "requires_action" => PaymentStatus::RequiresAction,
            "succeeded" => PaymentStatus::Succeeded,
            "failed" => PaymentStatus::Failed,
            "processing" => PaymentStatus::Processing,
            _ => PaymentStatus::Other(s),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(s: PaymentStatus) -> Self {
        match s {
            PaymentStatus::RequiresAction => "requires_action".to_string(),
            PaymentStatus::Succeeded => "succeeded".to_string(),
            PaymentStatus::Failed => "failed".to_string(),
            PaymentStatus::Processing => "processing".to_string(),
            PaymentStatus::Other(s) => s,
        }
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::RequiresAction => "requires_action",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Other(s) => s,
        }
    }
}

/// The processor's intent object, relayed to the caller verbatim.
///
/// `id` and `status` are the fields this system inspects; everything else the
/// processor returns is preserved in `extra` so the response round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: PaymentStatus,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Signed event envelope delivered by the processor.
///
/// Only deserialized after the signature over the raw body has verified.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}
