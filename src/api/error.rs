//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::access::AccessDenied;
use crate::db::DatabaseError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Self-remediation pointers, present only on PROFILE_REQUIRED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_profile_url: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_profile_url: Option<&'static str>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Caller has no patient or doctor profile")]
    ProfileRequired,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::Forbidden(detail) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", detail.clone())
            }
            ApiError::ProfileRequired => (
                StatusCode::FORBIDDEN,
                "PROFILE_REQUIRED",
                "You need to complete either a patient or doctor profile".to_string(),
            ),
            ApiError::Validation(detail) => {
                (StatusCode::BAD_REQUEST, "VALIDATION", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let (patient_profile_url, doctor_profile_url) = match &self {
            ApiError::ProfileRequired => {
                (Some("/api/v1/patient-profiles"), Some("/api/v1/doctors"))
            }
            _ => (None, None),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                patient_profile_url,
                doctor_profile_url,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, .. } => {
                ApiError::NotFound(format!("{entity_type} not found"))
            }
            DatabaseError::InvalidEnum { .. } => ApiError::Validation(err.to_string()),
            DatabaseError::ConstraintViolation(detail) => ApiError::Validation(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AccessDenied> for ApiError {
    fn from(err: AccessDenied) -> Self {
        match err {
            AccessDenied::Unauthenticated => ApiError::Unauthorized,
            AccessDenied::MissingRole => ApiError::ProfileRequired,
            AccessDenied::DoctorOnly => {
                ApiError::Forbidden("Only doctors may perform this operation".into())
            }
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
