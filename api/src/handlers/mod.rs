pub mod auth;
pub mod budgets;
pub mod categories;
pub mod chat;
pub mod health;
pub mod notifications;
pub mod profile;
pub mod reports;
pub mod settings;
pub mod transactions;
pub mod users;

// Common response types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::errors::{DatabaseError, ServiceError};
use serde::{Deserialize, Serialize};

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub trace_id: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ErrorResponse {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => ErrorResponse::new("not_found", message),
            ServiceError::BadRequest(message) => ErrorResponse::new("validation_error", message),
            ServiceError::Unauthorized(message) => ErrorResponse::new("unauthorized", message),
            ServiceError::Forbidden(message) => ErrorResponse::new("forbidden", message),
            ServiceError::PayloadTooLarge(message) => {
                ErrorResponse::new("payload_too_large", message)
            }
            ServiceError::Database(DatabaseError::NotFound(message)) => {
                ErrorResponse::new("not_found", message)
            }
            ServiceError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                ErrorResponse::new("database_error", "Internal server error")
            }
            ServiceError::Internal(message) => {
                tracing::error!(error = %message, "Internal error");
                ErrorResponse::new("internal_error", message)
            }
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Body of operations that only report an outcome
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// `skip`/`limit` query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Pagination {
    /// Reject negative offsets and page sizes
    pub fn checked(self) -> Result<Self, ErrorResponse> {
        check_page(self.skip, self.limit)?;
        Ok(self)
    }
}

pub(crate) fn check_page(skip: i64, limit: i64) -> Result<(), ErrorResponse> {
    if skip < 0 || limit < 0 {
        return Err(ErrorResponse::new(
            "validation_error",
            "skip and limit must not be negative",
        ));
    }
    Ok(())
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

pub type ApiResult<T> = Result<Json<T>, ErrorResponse>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::not_found("Budget not found"), StatusCode::NOT_FOUND),
            (ServiceError::bad_request("Amount must be positive"), StatusCode::BAD_REQUEST),
            (
                ServiceError::Unauthorized("Could not validate credentials".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ServiceError::forbidden("Cannot delete system category"),
                StatusCode::FORBIDDEN,
            ),
            (
                ServiceError::PayloadTooLarge("too big".to_string()),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                ServiceError::Internal("Error processing message: boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ErrorResponse::from(err);
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_database_errors_hide_details() {
        let response = ErrorResponse::from(ServiceError::Database(DatabaseError::QueryFailed(
            "relation \"users\" does not exist".to_string(),
        )));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.message, "Internal server error");

        let response = ErrorResponse::from(ServiceError::Database(DatabaseError::NotFound(
            "Record not found".to_string(),
        )));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_message_is_kept_for_client_errors() {
        let response = ErrorResponse::from(ServiceError::bad_request("Passwords do not match"));
        assert_eq!(response.error, "validation_error");
        assert_eq!(response.message, "Passwords do not match");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_pagination_defaults() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, 100);
    }

    #[test]
    fn test_negative_pagination_is_rejected() {
        let page: Pagination = serde_json::from_str(r#"{"skip": -1}"#).unwrap();
        let err = page.checked().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "skip and limit must not be negative");

        let page: Pagination = serde_json::from_str(r#"{"limit": -5}"#).unwrap();
        assert!(page.checked().is_err());

        let page: Pagination = serde_json::from_str(r#"{"skip": 20, "limit": 10}"#).unwrap();
        assert_eq!(page.checked().unwrap().skip, 20);
    }
}
