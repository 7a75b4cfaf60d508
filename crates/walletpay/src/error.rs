use thiserror::Error;

/// Errors returned by payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Request fields failed validation before any external call was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// The processor rejected the charge (declined card, bad token, rate
    /// limit). Not retryable — the processor made a decision.
    #[error("processor error: {0}")]
    Processor(String),

    /// The external call timed out. Retryable, distinct from a decline.
    #[error("processor request timed out after {0}s")]
    Timeout(u64),

    #[error("http error: {0}")]
    Http(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from webhook signature verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing signature header")]
    MissingHeader,

    #[error("malformed signature header: {0}")]
    MalformedHeader(String),

    #[error("timestamp outside tolerance")]
    StaleTimestamp,

    #[error("signature mismatch")]
    Mismatch,
}
