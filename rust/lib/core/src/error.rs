use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::types::{FieldErrors, NON_FIELD_ERRORS};

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these,
// never on the human-readable message string.

/// Stable error code constants.
///
/// Clients should match on `code` from `{"code": "NOT_FOUND", "message": "..."}`.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const INTERNAL: &str = "INTERNAL";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type returned by every handler.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. The JSON response always includes both:
///
/// ```json
/// {"code": "UNAUTHENTICATED", "message": "missing authorization header"}
/// ```
///
/// Field validation failures additionally carry a `detail` object:
///
/// ```json
/// {"code": "VALIDATION_FAILED", "message": "...", "detail": {"password2": ["..."]}}
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate key / resource already exists. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Input failed field-level validation. HTTP 400.
    #[error("{}", .0.summary())]
    InvalidFields(FieldErrors),

    /// Request is malformed outside of its payload (e.g. a disallowed host). HTTP 400.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid authentication credentials. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Conflict(_) => error_code::ALREADY_EXISTS,
            ServiceError::InvalidFields(_) => error_code::VALIDATION_FAILED,
            ServiceError::BadRequest(_) => error_code::BAD_REQUEST,
            ServiceError::Unauthorized(_) => error_code::UNAUTHENTICATED,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::InvalidFields(_) | ServiceError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body sent to the client.
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        if let ServiceError::InvalidFields(errors) = self {
            body["detail"] = serde_json::to_value(errors).unwrap_or_default();
        }
        body
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::InvalidFields(errors)
    }
}

/// A body that is not JSON, has the wrong content type, or does not fit the
/// expected shape is reported like any other validation failure.
impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::InvalidFields(FieldErrors::single(NON_FIELD_ERRORS, rejection.body_text()))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, axum::Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ServiceError::InvalidFields(FieldErrors::single("a", "b")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServiceError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::Storage("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(ServiceError::Conflict("x".into()).error_code(), "ALREADY_EXISTS");
        assert_eq!(
            ServiceError::InvalidFields(FieldErrors::new()).error_code(),
            "VALIDATION_FAILED"
        );
        assert_eq!(ServiceError::BadRequest("x".into()).error_code(), "BAD_REQUEST");
        assert_eq!(ServiceError::Unauthorized("x".into()).error_code(), "UNAUTHENTICATED");
        assert_eq!(ServiceError::Storage("x".into()).error_code(), "STORAGE_ERROR");
        assert_eq!(ServiceError::Internal("x".into()).error_code(), "INTERNAL");
    }

    #[test]
    fn json_response_format() {
        let err = ServiceError::Unauthorized("missing token".into());
        assert_eq!(
            err.to_json(),
            serde_json::json!({"code": "UNAUTHENTICATED", "message": "missing token"})
        );
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn field_errors_carry_detail() {
        let err: ServiceError = FieldErrors::single("password2", "Mismatch.").into();
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["message"], "password2: Mismatch.");
        assert_eq!(body["detail"]["password2"][0], "Mismatch.");
    }

    #[test]
    fn json_rejection_becomes_non_field_error() {
        use axum::extract::rejection::MissingJsonContentType;

        let err: ServiceError = JsonRejection::from(MissingJsonContentType::default()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert!(body["detail"][NON_FIELD_ERRORS][0].as_str().unwrap().contains("application/json"));
    }

    #[test]
    fn error_display_is_just_message() {
        assert_eq!(ServiceError::NotFound("user 123".into()).to_string(), "user 123");
        assert_eq!(ServiceError::Conflict("dup key".into()).to_string(), "dup key");
        assert_eq!(ServiceError::Unauthorized("missing token".into()).to_string(), "missing token");
    }
}
