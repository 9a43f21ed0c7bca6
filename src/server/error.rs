//! Client-facing error responses.
//!
//! Every failure ends here and becomes `{ "error": .., "details"?: .. }`
//! with the status the browser client expects.

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::types::{
    GatewayError, RequestError, MSG_API_KEY_UNAUTHORIZED, MSG_CONFIGURATION, MSG_FETCH_FAILED,
    MSG_INVALID_API_KEY, MSG_LOCATION_NOT_FOUND, MSG_MALFORMED_QUERY,
};

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Request(RequestError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            ApiError::Request(RequestError::Configuration) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Gateway(GatewayError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable client message, plus the diagnostic for the
    /// unavailable category only.
    pub fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            ApiError::Request(RequestError::InvalidRequest(msg)) => (msg.as_str(), None),
            ApiError::Request(RequestError::Configuration) => (MSG_CONFIGURATION, None),
            ApiError::Gateway(GatewayError::NotFound) => (MSG_LOCATION_NOT_FOUND, None),
            ApiError::Gateway(GatewayError::InvalidApiKey) => (MSG_INVALID_API_KEY, None),
            ApiError::Gateway(GatewayError::Unauthorized) => (MSG_API_KEY_UNAUTHORIZED, None),
            ApiError::Gateway(GatewayError::Unavailable { details }) => {
                (MSG_FETCH_FAILED, Some(details.clone()))
            }
        };
        ErrorBody {
            error: error.to_string(),
            details,
        }
    }
}

/// A query string serde can't map onto the parameters at all, e.g. a
/// repeated `city`. The framework's wording stays in the log.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!(reason = %rejection.body_text(), "Rejected forecast query string");
        ApiError::Request(RequestError::InvalidRequest(MSG_MALFORMED_QUERY.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Gateway failures are logged where they happen, with upstream context.
        if let ApiError::Request(RequestError::Configuration) = self {
            error!("WEATHER_API_KEY is not configured; rejecting forecast request");
        }
        (self.status(), Json(self.body())).into_response()
    }
}
