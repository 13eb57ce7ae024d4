use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Stripe rejected the request. Error {status}. {}", .error.message)]
    Api { status: u16, error: StripeError },
}

/// The `error` object of a failed Stripe call.
///
/// `raw` holds the object exactly as it was received so that callers can hand it back to their own clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StripeError {
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub decline_code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

impl StripeError {
    /// Parses an error response body. Bodies that are not Stripe error envelopes are kept as the message.
    pub fn from_response_body(body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: Value,
        }
        match serde_json::from_str::<Envelope>(body) {
            Ok(Envelope { error }) => {
                let mut result = serde_json::from_value::<StripeError>(error.clone()).unwrap_or_default();
                result.raw = error;
                result
            },
            Err(_) => Self { message: body.to_string(), raw: Value::String(body.to_string()), ..Default::default() },
        }
    }
}
