//! Request-level errors and the `{ data, error }` JSON envelope every handler
//! answers with.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::store::StoreError;

/// The `error` half of the envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Envelope shared by successful and failed responses. Exactly one of
/// `data` and `error` is set.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            error: None,
        })
    }

    pub fn error(code: &str, message: &str) -> Json<Self> {
        Json(Self {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        })
    }
}

/// Everything a view can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing, malformed or expired bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Signed in, but without the tenant role the view needs.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The view's scope was cancelled before its store calls finished.
    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and envelope code.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::InvalidTransition(_) => (StatusCode::BAD_REQUEST, "INVALID_TRANSITION"),
            AppError::Store(_) => (StatusCode::BAD_GATEWAY, "STORE_ERROR"),
            AppError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Text shown to the caller. Store and internal failures are logged and
    /// replaced with a generic message.
    fn public_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidTransition(msg) => msg.clone(),
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::InvalidCredentials => self.to_string(),
            AppError::Cancelled => "The request was cancelled".to_string(),
            AppError::Store(e) => {
                tracing::error!(error = %e, status = ?e.status(), "Store error");
                "The data store is unavailable, please retry".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                "An internal error occurred".to_string()
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let detail = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field} {detail}")
            })
            .collect();
        fields.sort();
        AppError::Validation(fields.join("; "))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.public_message();
        (status, ApiResponse::<()>::error(code, &message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn success_envelope_has_no_error() {
        let json = serde_json::to_value(&ApiResponse::success("hello").0).unwrap();
        assert_eq!(json["data"], "hello");
        assert!(json["error"].is_null());
    }

    #[test]
    fn error_envelope_has_no_data() {
        let json =
            serde_json::to_value(&ApiResponse::<()>::error("NOT_FOUND", "Client not found").0)
                .unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Client not found");
    }

    #[test]
    fn both_auth_failures_are_401() {
        assert_eq!(AppError::Unauthorized.status_and_code().0, StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::InvalidCredentials.status_and_code(),
            (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
        );
    }

    #[test]
    fn transition_errors_are_bad_requests() {
        let err = AppError::InvalidTransition("completed to scheduled".to_string());
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, "INVALID_TRANSITION")
        );
        assert_eq!(err.public_message(), "completed to scheduled");
    }

    #[test]
    fn store_failures_hide_details() {
        let err: AppError = StoreError::Empty.into();
        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(
            err.public_message(),
            "The data store is unavailable, please retry"
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn cancelled_is_service_unavailable() {
        let response = AppError::Cancelled.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "is required"))]
        name: String,
        #[validate(email(message = "must be a valid email"))]
        email: String,
    }

    #[test]
    fn validation_errors_list_fields_in_order() {
        let form = Form {
            name: String::new(),
            email: "nope".to_string(),
        };
        let err: AppError = form.validate().unwrap_err().into();
        assert_eq!(
            err.to_string(),
            "Validation error: email must be a valid email; name is required"
        );
    }
}
