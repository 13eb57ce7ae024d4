use std::{env, io::Write};

use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde_json::json;
use sf_common::{parse_boolean_flag, parse_percentage, Secret};
use storefront_engine::DEFAULT_SPLIT_PERCENT;
use stripe_tools::StripeConfig;
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_SF_HOST: &str = "127.0.0.1";
const DEFAULT_SF_PORT: u16 = 8480;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;
const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;
const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// The share of each mediated line item paid to the intermediary, as a whole-number percentage.
    pub revenue_split_percent: i64,
    /// Capacity of each event hook queue.
    pub event_buffer_size: usize,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the `for=` field of the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    pub stripe: StripeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SF_HOST.to_string(),
            port: DEFAULT_SF_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            revenue_split_percent: DEFAULT_SPLIT_PERCENT,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            use_x_forwarded_for: false,
            use_forwarded: false,
            stripe: StripeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SF_HOST").ok().unwrap_or_else(|| DEFAULT_SF_HOST.into());
        let port = env::var("SF_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for SF_PORT. {e} Using the default, {DEFAULT_SF_PORT}, instead.");
                    DEFAULT_SF_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SF_PORT);
        let database_url = env::var("SF_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SF_DATABASE_URL is not set. Please set it to the URL for the storefront database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let revenue_split_percent = env::var("SF_REVENUE_SPLIT_PERCENT")
            .map_err(|_| info!("🪛️ SF_REVENUE_SPLIT_PERCENT is not set. Using {DEFAULT_SPLIT_PERCENT}%."))
            .and_then(|s| {
                parse_percentage(&s).ok_or_else(|| {
                    warn!("🪛️ {s} is not a valid value for SF_REVENUE_SPLIT_PERCENT. Using {DEFAULT_SPLIT_PERCENT}%.")
                })
            })
            .unwrap_or(DEFAULT_SPLIT_PERCENT);
        let event_buffer_size = env::var("SF_EVENT_BUFFER_SIZE")
            .ok()
            .and_then(|s| {
                s.parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .or_else(|| {
                        warn!("🪛️ Invalid value for SF_EVENT_BUFFER_SIZE ({s}). Using {DEFAULT_EVENT_BUFFER_SIZE}.");
                        None
                    })
            })
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        let use_x_forwarded_for = parse_boolean_flag(env::var("SF_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("SF_USE_FORWARDED").ok(), false);
        let stripe = StripeConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            auth,
            revenue_split_percent,
            event_buffer_size,
            use_x_forwarded_for,
            use_forwarded,
            stripe,
        }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC secret used to sign and verify access tokens (HS256).
    pub jwt_secret: Secret<String>,
    /// How long issued access tokens remain valid, in hours.
    pub token_lifetime_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this since every issued token becomes invalid on restart. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        match NamedTempFile::new().ok().and_then(|f| f.keep().ok()) {
            Some((mut f, p)) => {
                let key_data = json!({ "jwt_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT secret for this session was written to {}. If this is a production instance, \
                         you are doing it wrong! Set the SF_JWT_SECRET environment variable instead. 🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT secret to the temporary file. {e}"),
                }
            },
            None => warn!("🪛️ Could not create a temporary file to store the JWT secret."),
        }
        Self { jwt_secret: Secret::new(secret), token_lifetime_hours: DEFAULT_TOKEN_LIFETIME_HOURS }
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: &str) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.to_string()), token_lifetime_hours: DEFAULT_TOKEN_LIFETIME_HOURS }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("SF_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [SF_JWT_SECRET]")))?;
        if secret.trim().len() < MIN_JWT_SECRET_LENGTH {
            return Err(ServerError::ConfigurationError(format!(
                "SF_JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters long"
            )));
        }
        let token_lifetime_hours = env::var("SF_TOKEN_LIFETIME_HOURS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .ok()
                    .filter(|h| *h > 0)
                    .or_else(|| {
                        warn!("🪛️ Invalid value for SF_TOKEN_LIFETIME_HOURS ({s}). Using the default.");
                        None
                    })
            })
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_HOURS);
        Ok(Self { jwt_secret: Secret::new(secret.trim().to_string()), token_lifetime_hours })
    }
}
