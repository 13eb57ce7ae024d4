use std::time::Duration;

use log::*;
use sf_common::Secret;

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com/v1";
pub const DEFAULT_STRIPE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Base url, including the version path segment. Override this to point at a stripe-mock instance.
    pub api_url: String,
    pub api_key: Secret<String>,
    /// Pins the `Stripe-Version` header. The account default is used when this is `None`.
    pub api_version: Option<String>,
    pub timeout: Duration,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_STRIPE_API_URL.to_string(),
            api_key: Secret::default(),
            api_version: None,
            timeout: DEFAULT_STRIPE_TIMEOUT,
        }
    }
}

impl StripeConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("SF_STRIPE_API_URL").unwrap_or_else(|_| {
            info!("🪛️ SF_STRIPE_API_URL not set, using {DEFAULT_STRIPE_API_URL}");
            DEFAULT_STRIPE_API_URL.to_string()
        });
        let api_key = Secret::new(std::env::var("SF_STRIPE_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ SF_STRIPE_API_KEY not set. Every call to the payment processor will be rejected.");
            String::default()
        }));
        let api_version = std::env::var("SF_STRIPE_API_VERSION").ok().filter(|s| !s.trim().is_empty());
        if api_version.is_none() {
            info!("🪛️ SF_STRIPE_API_VERSION not set, using the account's default API version");
        }
        let timeout = std::env::var("SF_STRIPE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for SF_STRIPE_TIMEOUT_SECS ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_STRIPE_TIMEOUT);
        Self { api_url, api_key, api_version, timeout }
    }
}
