//! Custom Axum extractors.
//!
//! - [`JsonPayload`]: request body parsed as arbitrary JSON
//! - [`QueryPayload`]: query string as a JSON object of strings
//! - [`CorrelationId`]: the id assigned by the correlation middleware
//! - [`AdminBearer`]: proof that the request carried the admin token
//!
//! Payload extractors hand untyped JSON to the validation layer so that a
//! missing field produces one `VALIDATION_ERROR` listing every absent field,
//! rather than a serde rejection naming only the first.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Request body parsed as JSON, whatever its content type.
///
/// Malformed JSON is a `VALIDATION_ERROR`; other body failures keep their own
/// status, e.g. 413 for a body over the configured limit.
#[derive(Debug, Clone)]
pub struct JsonPayload(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            let status = rejection.status();
            if status == StatusCode::BAD_REQUEST {
                AppError::validation(rejection.body_text())
            } else if status == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::new(status, rejection.body_text(), "PAYLOAD_TOO_LARGE")
            } else {
                AppError::new(status, rejection.body_text(), "INVALID_BODY")
            }
        })?;

        let value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::validation(format!("Request body is not valid JSON: {e}")))?;

        Ok(Self(value))
    }
}

/// Query string parameters as a JSON object.
///
/// Repeated keys keep the last value.
#[derive(Debug, Clone)]
pub struct QueryPayload(pub Value);

#[async_trait]
impl<S> FromRequestParts<S> for QueryPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<BTreeMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        let object: Map<String, Value> = params
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        Ok(Self(Value::Object(object)))
    }
}

/// Correlation ID for request tracing.
///
/// Read from the request extensions populated by
/// [`crate::middleware::correlation_id`]; falls back to the
/// `X-Correlation-ID` header, then to a fresh UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        let correlation_id = parts
            .headers
            .get(crate::middleware::CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Admin authorization for destructive operations.
///
/// Requires `Authorization: Bearer <token>` matching the configured admin
/// token, compared in constant time.
///
/// # Rejections
///
/// - 403 when no admin token is configured (the operation is disabled)
/// - 401 when the header is missing or not a bearer token
/// - 403 when the token does not match
#[derive(Debug, Clone, Copy)]
pub struct AdminBearer;

#[async_trait]
impl FromRequestParts<AppState> for AdminBearer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token() else {
            return Err(AppError::forbidden("Administrative operations are disabled"));
        };

        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

        if constant_time_eq::constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
            Ok(Self)
        } else {
            tracing::warn!("Rejected admin request with invalid token");
            Err(AppError::forbidden("Invalid admin token"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::Router;
    use axum::extract::DefaultBodyLimit;
    use axum::http::Request as HttpRequest;
    use axum::routing::post;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn json_payload_ignores_content_type() {
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"eventName": "Gig"}"#))
            .unwrap();

        let JsonPayload(value) = JsonPayload::from_request(req, &()).await.unwrap();
        assert_eq!(value, json!({"eventName": "Gig"}));
    }

    #[tokio::test]
    async fn json_payload_rejects_malformed_body() {
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("{not json"))
            .unwrap();

        let err = JsonPayload::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn json_payload_over_body_limit_is_payload_too_large() {
        let app = Router::new()
            .route(
                "/",
                post(|JsonPayload(value): JsonPayload| async move { value.to_string() }),
            )
            .layer(DefaultBodyLimit::max(8));
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"eventName": "A rather long event name"}"#))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn query_payload_collects_parameters() {
        let req = HttpRequest::builder()
            .uri("/ticket/query?userAddress=alice&eventName=Gig%20Night")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = req.into_parts();

        let QueryPayload(value) = QueryPayload::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(value, json!({"userAddress": "alice", "eventName": "Gig Night"}));
    }

    #[tokio::test]
    async fn query_payload_without_query_is_empty_object() {
        let req = HttpRequest::builder()
            .uri("/ticket/query")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = req.into_parts();

        let QueryPayload(value) = QueryPayload::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn correlation_id_from_header() {
        let id = Uuid::new_v4();
        let req = HttpRequest::builder()
            .uri("/")
            .header("X-Correlation-ID", id.to_string())
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = req.into_parts();

        let extracted = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(extracted, CorrelationId(id));
    }
}
