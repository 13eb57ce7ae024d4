use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use storefront_engine::CommerceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("{0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("{0}")]
    ProcessorUnavailable(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::CouldNotIssueToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::PreconditionFailed(_) => StatusCode::UNAUTHORIZED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::ProcessorUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided. Send one in the Authorization header as a bearer token.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Could not issue access token. {0}")]
    CouldNotIssueToken(String),
}

/// Maps engine failures that are not `{error}` envelopes onto transport-level errors.
///
/// Routes hand expected failures back in a 200 response before reaching this conversion (see
/// [`crate::data_objects::JsonResponse`]), so `Conflict` and processor errors only land here if a caller skipped that
/// step.
impl From<CommerceError> for ServerError {
    fn from(e: CommerceError) -> Self {
        match e {
            CommerceError::PreconditionFailed(s) => Self::PreconditionFailed(s),
            CommerceError::InvalidArgument(s) => Self::InvalidArgument(s),
            CommerceError::NotFound(s) => Self::NoRecordFound(s),
            CommerceError::PermissionDenied(s) => Self::InsufficientPermissions(s),
            CommerceError::UnrecognizedProcessorError(s) => {
                error!("💻️ Payment processor failure: {s}");
                Self::ProcessorUnavailable(format!("The payment processor could not complete the request. {s}"))
            },
            CommerceError::StoreError(s) => {
                error!("💻️ Storage failure: {s}");
                Self::BackendError(format!("An error occurred on the backend of the server. {s}"))
            },
            e @ CommerceError::Conflict { .. } => Self::Unspecified(e.to_string()),
            e @ CommerceError::ExternalProcessorError { .. } => Self::Unspecified(e.to_string()),
        }
    }
}
