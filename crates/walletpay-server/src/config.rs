use std::env;

const DEFAULT_PORT: u16 = 4242;
const DEFAULT_CURRENCY: &str = "usd";
const DEFAULT_RATE_LIMIT_RPM: u64 = 120;

/// Process-wide configuration, read once at startup and never mutated.
///
/// Handlers receive it through [`crate::state::AppState`]; nothing reads the
/// environment after startup.
#[derive(Clone)]
pub struct ServerConfig {
    /// Processor API secret key. Startup fails without it — the alternative
    /// would be sending unauthenticated charge requests.
    pub secret_key: String,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: Vec<u8>,
    /// Processor API base URL (overridable for tests and mocks).
    pub api_base: String,
    /// Currency applied when a request omits one.
    pub default_currency: String,
    /// Server port
    pub port: u16,
    /// CORS allowed origins
    pub allowed_origins: Vec<String>,
    /// Rate limit requests per minute
    pub rate_limit_rpm: u64,
    /// Bearer token required for /metrics endpoint (None = 403 by default)
    pub metrics_token: Option<Vec<u8>>,
    /// Explicit opt-in to an unauthenticated /metrics endpoint
    pub public_metrics: bool,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("default_currency", &self.default_currency)
            .field("port", &self.port)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("public_metrics", &self.public_metrics)
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Required: processor credentials
        let secret_key = env::var("STRIPE_SECRET_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingRequired("STRIPE_SECRET_KEY"))?;

        let webhook_secret = env::var("STRIPE_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.into_bytes())
            .ok_or(ConfigError::MissingRequired("STRIPE_WEBHOOK_SECRET"))?;

        if webhook_secret.len() < 32 {
            tracing::warn!(
                "STRIPE_WEBHOOK_SECRET is only {} bytes (minimum 32 recommended)",
                webhook_secret.len()
            );
        }

        // Optional: API base
        let api_base = env::var("STRIPE_API_BASE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| walletpay::processor::DEFAULT_API_BASE.to_string());

        // Optional: default currency
        let default_currency = env::var("DEFAULT_CURRENCY")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        // Optional: port
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        // Optional: allowed origins
        let allowed_origins: Vec<String> = env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        // Optional: rate limit
        let rate_limit_rpm = env::var("RATE_LIMIT_RPM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_RPM);

        // Optional: metrics token
        let metrics_token = env::var("METRICS_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.into_bytes());

        // Optional: explicit opt-in to unauthenticated /metrics
        let public_metrics = env::var("WALLETPAY_PUBLIC_METRICS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        if metrics_token.is_none() && !public_metrics {
            tracing::warn!(
                "METRICS_TOKEN not set — /metrics requires it or WALLETPAY_PUBLIC_METRICS=true"
            );
        } else if public_metrics {
            tracing::warn!("WALLETPAY_PUBLIC_METRICS=true — /metrics is publicly accessible");
        }

        Ok(Self {
            secret_key,
            webhook_secret,
            api_base,
            default_currency,
            port,
            allowed_origins,
            rate_limit_rpm,
            metrics_token,
            public_metrics,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),
}
