//! Error types for web handlers.
//!
//! [`AppError`] is the single error type returned by handlers. Lifecycle
//! failures convert into it through `From<TicketError>`, which fixes the
//! status code for every failure kind.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use ticket_chain_core::{StoreError, TicketError, ValidationError};

/// Application error type for web handlers.
///
/// Carries an HTTP status, a user-facing message and a stable error code.
/// Server errors are logged when turned into a response; the optional source
/// is logged but never sent to the client.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<Vec<Ticket>>, AppError> {
///     let tickets = state.service.query_tickets("alice", None).await?;
///     Ok(Json(tickets))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: &'static str,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach a source error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// The HTTP status this error responds with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Create a 400 Bad Request error for an invalid payload.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "VALIDATION_ERROR")
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED")
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into(), "FORBIDDEN")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND")
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), "CONFLICT")
    }

    /// Create a 504 Gateway Timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message.into(), "TIMEOUT")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE",
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: &'static str,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Request failed"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Request failed"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        let message = err.to_string();
        match err {
            TicketError::Validation(_) => Self::validation(message),
            TicketError::NotFound(_) => Self::not_found(message),
            TicketError::Conflict(_) | TicketError::AlreadyRedeemed(_) => {
                Self::conflict(message)
            }
            TicketError::Timeout { .. } => Self::timeout("The ticket store did not answer in time")
                .with_source(anyhow::Error::new(err)),
            TicketError::Store(StoreError::Serialization(_)) => {
                Self::internal("A stored document could not be read")
                    .with_source(anyhow::Error::new(err))
            }
            TicketError::Store(_) => Self::unavailable("The ticket store is unavailable")
                .with_source(anyhow::Error::new(err)),
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use ticket_chain_core::TicketKey;

    #[test]
    fn test_error_display() {
        let err = AppError::validation("Missing required fields: eventName");
        assert_eq!(
            err.to_string(),
            "[VALIDATION_ERROR] Missing required fields: eventName"
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_ticket_errors_map_to_status() {
        let key = TicketKey::new("0xA", "T1");
        let cases = [
            (TicketError::NotFound(key.clone()), StatusCode::NOT_FOUND),
            (TicketError::Conflict(key.clone()), StatusCode::CONFLICT),
            (TicketError::AlreadyRedeemed(key), StatusCode::CONFLICT),
            (
                TicketError::Timeout {
                    operation: "find",
                    timeout: Duration::from_millis(5),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                TicketError::Store(StoreError::Database("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                TicketError::Store(StoreError::Serialization("bad".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                TicketError::Validation(ValidationError::NotAnObject),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).status(), status);
        }
    }

    #[test]
    fn test_store_details_are_not_exposed() {
        let err = AppError::from(TicketError::Store(StoreError::Database(
            "password authentication failed".into(),
        )));
        assert!(!err.to_string().contains("password"));
        assert_eq!(err.code(), "SERVICE_UNAVAILABLE");
    }
}
