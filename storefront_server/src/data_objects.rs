use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storefront_engine::{db_types::ActorId, CommerceError};

use crate::errors::ServerError;

/// The body of every `/api` response that reaches a handler.
///
/// Successes are wrapped as `{"result": ...}`. Expected failures (an order in the wrong state, a processor refusal, an
/// empty draft) are not transport errors: they come back with a 200 status as `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonResponse {
    Result(Value),
    Error(Value),
}

impl JsonResponse {
    pub fn success<T: Serialize>(value: T) -> Result<Self, ServerError> {
        serde_json::to_value(value)
            .map(JsonResponse::Result)
            .map_err(|e| ServerError::Unspecified(format!("Could not serialize response. {e}")))
    }

    /// Sorts an engine outcome into a response body, or a transport-level error.
    pub fn from_outcome<T: Serialize>(outcome: Result<T, CommerceError>) -> Result<Self, ServerError> {
        match outcome {
            Ok(value) => Self::success(value),
            Err(e) => match e.envelope() {
                Some(envelope) => Ok(JsonResponse::Error(envelope)),
                None => Err(e.into()),
            },
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::Ok().json(self)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmParams {
    #[serde(default)]
    pub payment_intent_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishParams {
    #[serde(default)]
    pub product_draft_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPayoutAccountParams {
    pub actor_id: ActorId,
    pub external_account_id: String,
}
