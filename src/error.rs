use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::BadRequest(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        ApiError::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        ApiError::BadRequest(value.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::UserNotFound(_)
            | StoreError::ClassNotFound(_)
            | StoreError::BookingNotFound(_)
            | StoreError::PackageNotFound(_)
            | StoreError::NotificationNotFound(_) => ApiError::NotFound(value.to_string()),
            StoreError::NotPending(_)
            | StoreError::NotApproved(_)
            | StoreError::NoActivePackage
            | StoreError::PackageOwnerMismatch
            | StoreError::ExceedsPackageTotal(_)
            | StoreError::InvalidDuration(_)
            | StoreError::UnlimitedPackage
            | StoreError::RemindersDisabled => ApiError::BadRequest(value.to_string()),
            StoreError::AlreadyBooked | StoreError::ClassFull | StoreError::AlreadyCancelled => {
                ApiError::Conflict(value.to_string())
            }
            StoreError::Io(_) | StoreError::Json(_) => {
                error!("Store error: {value}");
                ApiError::Internal("Internal server error".into())
            }
        }
    }
}
