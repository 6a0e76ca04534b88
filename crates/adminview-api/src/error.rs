//! Error types for adminview-api

use adminview_core::{CoreError, ErrorCode};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e.code() {
                ErrorCode::RecordNotFound => StatusCode::NOT_FOUND,
                ErrorCode::ActionNotAllowed | ErrorCode::InvalidColumnReference | ErrorCode::ReasonRequired => {
                    StatusCode::BAD_REQUEST
                }
                ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorCode::DuplicateRecord => StatusCode::CONFLICT,
                ErrorCode::SourceUnavailable | ErrorCode::InvalidFormat => StatusCode::BAD_GATEWAY,
                ErrorCode::DuplicateColumn | ErrorCode::IoError | ErrorCode::InternalError => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(e) => {
                let details = e.to_details();
                serde_json::json!({
                    "success": false,
                    "message": details.message,
                    "code": details.code,
                    "suggestions": details.suggestions,
                })
            }
            other => serde_json::json!({
                "success": false,
                "message": other.to_string(),
                "code": if status == StatusCode::NOT_FOUND { "NOT_FOUND" } else { "BAD_REQUEST" },
                "suggestions": Vec::<String>::new(),
            }),
        };

        if status.is_server_error() {
            log::error!("{} -> {}", self, status);
        } else {
            log::debug!("{} -> {}", self, status);
        }
        (status, Json(body)).into_response()
    }
}
