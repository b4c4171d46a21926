use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use application::ports::in_::ExperimentServiceError;
use domain::SimulationError;

/// Errors of the HTTP surface, each mapped to one status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was understood but refused, e.g. a trade beyond capital.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The session is not in a phase that allows the request.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ExperimentServiceError> for ApiError {
    fn from(err: ExperimentServiceError) -> Self {
        match err {
            ExperimentServiceError::SessionNotFound(id) => ApiError::NotFound(format!("participant {id}")),
            ExperimentServiceError::Simulation(err @ SimulationError::InvalidPeriodRequest { .. }) => {
                ApiError::Conflict(err.to_string())
            }
            ExperimentServiceError::Simulation(err) => ApiError::Rejected(err.to_string()),
            ExperimentServiceError::Survey(err) => ApiError::Rejected(err.to_string()),
            ExperimentServiceError::Persistence(err) => ApiError::Unavailable(err.to_string()),
            ExperimentServiceError::PriceData(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = axum::Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
