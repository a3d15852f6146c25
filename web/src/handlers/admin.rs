//! Administrative routes.

use crate::WebResult;
use crate::extractors::{AdminBearer, CorrelationId};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode};

/// Delete every ticket, redemption and event code.
///
/// # Endpoint
///
/// ```text
/// GET /resetDatabase
/// Authorization: Bearer <admin token>
/// ```
///
/// # Responses
///
/// - 200 `Database cleaned`
/// - 401 without a bearer token
/// - 403 with a wrong token, or when no admin token is configured
pub async fn reset_database(
    _admin: AdminBearer,
    CorrelationId(correlation_id): CorrelationId,
    State(state): State<AppState>,
) -> WebResult<(StatusCode, &'static str)> {
    let summary = state.service().reset_store().await?;

    tracing::warn!(
        %correlation_id,
        new_tickets = summary.new_tickets,
        used_tickets = summary.used_tickets,
        events = summary.events,
        "Database reset by administrator"
    );
    Ok((StatusCode::OK, "Database cleaned"))
}
