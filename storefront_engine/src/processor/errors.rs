use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const RESOURCE_MISSING: &str = "resource_missing";
const CARD_ERROR: &str = "card_error";
const PAYMENT_ATTEMPT_FAILED: &str = "payment_intent_payment_attempt_failed";

/// A structured error returned by the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorErrorBody {
    /// HTTP status of the processor response
    pub status: u16,
    /// The processor's error type, e.g. `card_error` or `invalid_request_error`
    pub kind: String,
    pub code: Option<String>,
    pub decline_code: Option<String>,
    pub message: String,
    pub param: Option<String>,
    /// The error object exactly as the processor sent it
    pub raw: Value,
}

#[derive(Debug, Clone, Error)]
pub enum ProcessorError {
    #[error("{}", .0.message)]
    Rejected(ProcessorErrorBody),
    #[error("Could not complete the payment processor request. {0}")]
    Transport(String),
}

/// How a failed payment call should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The payment itself was refused. The order's payment has failed.
    Definitive,
    /// The processor understood and rejected the request. Nothing changed on either side.
    Known,
    /// Outage, credentials, throttling or anything else we can't reason about.
    Unrecognized,
}

impl ProcessorError {
    pub fn body(&self) -> Option<&ProcessorErrorBody> {
        match self {
            ProcessorError::Rejected(body) => Some(body),
            ProcessorError::Transport(_) => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.body().and_then(|b| b.code.as_deref())
    }

    pub fn is_resource_missing(&self) -> bool {
        self.code() == Some(RESOURCE_MISSING)
    }

    pub fn classify(&self) -> FailureClass {
        let Some(body) = self.body() else {
            return FailureClass::Unrecognized;
        };
        if body.kind == CARD_ERROR || body.code.as_deref() == Some(PAYMENT_ATTEMPT_FAILED) {
            return FailureClass::Definitive;
        }
        match (body.kind.as_str(), body.status) {
            (_, 401 | 429) => FailureClass::Unrecognized,
            ("invalid_request_error" | "idempotency_error", 400..=499) => FailureClass::Known,
            _ => FailureClass::Unrecognized,
        }
    }

    /// The processor's error object, if there is one
    pub fn raw(&self) -> Option<&Value> {
        self.body().map(|b| &b.raw)
    }
}

/// The result of a call to the processor for something that is allowed to be missing on the processor's side.
#[derive(Debug, Clone)]
pub enum ExternalOutcome<T> {
    Ok(T),
    /// The processor does not know about a resource the call depends on. Nothing to do until it does.
    RecoverableExternalGap(ProcessorError),
    /// Anything else. The local record must be corrected to reflect that the mirror failed.
    FatalExternalError(ProcessorError),
}

impl<T> From<Result<T, ProcessorError>> for ExternalOutcome<T> {
    fn from(result: Result<T, ProcessorError>) -> Self {
        match result {
            Ok(v) => ExternalOutcome::Ok(v),
            Err(e) if e.is_resource_missing() => ExternalOutcome::RecoverableExternalGap(e),
            Err(e) => ExternalOutcome::FatalExternalError(e),
        }
    }
}
