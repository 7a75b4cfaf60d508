use std::sync::Arc;

use walletpay::processor::ProcessorClient;

/// Shared application state for the payment server.
///
/// Everything here is read-only after startup, so concurrent requests read
/// it without synchronization.
pub struct AppState {
    /// Outbound processor client. A trait object so tests can substitute a
    /// stub that never touches the network.
    pub processor: Arc<dyn ProcessorClient>,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: Vec<u8>,
    /// Currency applied when a request omits one.
    pub default_currency: String,
    /// Bearer token for the /metrics endpoint (None = 403 by default).
    pub metrics_token: Option<Vec<u8>>,
    /// Explicit startup opt-in to an unauthenticated /metrics endpoint.
    pub public_metrics: bool,
}
