use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tax_core::ServiceError;
use tax_core::validation::ValidationError;
use tax_data::BatchError;
use thiserror::Error;
use tracing::{error, warn};

/// Every failure a handler can report. Clients only ever see the
/// `Display` text, wrapped as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Error when binding JSON")]
    Binding(#[from] JsonRejection),

    #[error("Validation fields does not pass")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Upload(String),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::Validation(e),
            ServiceError::Repository(e) => ApiError::Internal(e.to_string()),
            ServiceError::Deduction(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Binding(_)
            | ApiError::Validation(_)
            | ApiError::Upload(_)
            | ApiError::Batch(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Binding(rejection) => warn!(%rejection, "malformed request body"),
            ApiError::Validation(reason) => warn!(%reason, "request failed validation"),
            ApiError::Internal(detail) => error!(%detail, "request failed"),
            _ => warn!(error = %self, "request rejected"),
        }

        let status = self.status();
        let body = Json(ErrorBody {
            message: self.to_string(),
        });
        let mut response = (status, body).into_response();
        if let ApiError::Unauthorized = self {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"admin\""),
            );
        }
        response
    }
}
