use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::links::CreateLinkError;
use crate::validation::ValidationError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid link id")]
    InvalidId,
    #[error("alias already exists")]
    Conflict,
    #[error("link not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<CreateLinkError> for ApiError {
    fn from(err: CreateLinkError) -> Self {
        match err {
            CreateLinkError::Validation(e) => ApiError::Validation(e),
            CreateLinkError::Conflict => ApiError::Conflict,
            CreateLinkError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, field) = match self {
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.message, e.field),
            ApiError::InvalidId => (StatusCode::BAD_REQUEST, "Invalid ID".to_string(), None),
            ApiError::Conflict => (
                StatusCode::BAD_REQUEST,
                "Alias already exists".to_string(),
                Some("alias"),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Link not found".to_string(), None),
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse { message, field })).into_response()
    }
}
