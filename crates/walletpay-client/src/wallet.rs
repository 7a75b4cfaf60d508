//! Wallet result shape resolution.
//!
//! The provider's result is modeled as a tagged union resolved once, up
//! front, by explicit match — adding a third provider shape is a one-variant
//! addition rather than another ad hoc field probe at send time.

use thiserror::Error;

/// Errors surfaced to the user by the client SDK.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The wallet plugin's result matched no known shape. Fails loudly —
    /// an empty token must never be sent to the backend.
    #[error("could not extract a payment token from the wallet result")]
    TokenExtraction,

    #[error("request failed: {0}")]
    Http(String),

    #[error("backend error: {0}")]
    Api(String),
}

/// A provider-tagged wallet plugin result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletResult {
    /// Google Pay style: token under `paymentMethodData.tokenizationData.token`.
    NestedTokenization { token: String },
    /// Flat style: a top-level `token` field.
    FlatToken { token: String },
    /// No known shape matched.
    Unrecognized,
}

impl WalletResult {
    /// Resolve a raw wallet plugin result into its tagged shape.
    ///
    /// The nested shape is checked first; empty token strings resolve to
    /// [`WalletResult::Unrecognized`].
    pub fn from_value(value: &serde_json::Value) -> Self {
        let nested = value
            .get("paymentMethodData")
            .and_then(|d| d.get("tokenizationData"))
            .and_then(|d| d.get("token"))
            .and_then(|t| t.as_str());

        if let Some(token) = nested.filter(|t| !t.is_empty()) {
            return WalletResult::NestedTokenization {
                token: token.to_string(),
            };
        }

        let flat = value.get("token").and_then(|t| t.as_str());
        if let Some(token) = flat.filter(|t| !t.is_empty()) {
            return WalletResult::FlatToken {
                token: token.to_string(),
            };
        }

        WalletResult::Unrecognized
    }

    /// The extracted payment token, or a loud failure for unrecognized shapes.
    pub fn payment_token(&self) -> Result<&str, ClientError> {
        match self {
            WalletResult::NestedTokenization { token } => Ok(token),
            WalletResult::FlatToken { token } => Ok(token),
            WalletResult::Unrecognized => Err(ClientError::TokenExtraction),
        }
    }
}
