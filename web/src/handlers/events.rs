//! Event QR code routes.

use crate::WebResult;
use crate::extractors::{JsonPayload, QueryPayload};
use crate::response::{Created, Flag};
use crate::state::AppState;
use axum::extract::State;
use ticket_chain_core::validate;
use ticket_chain_core::validation::{fields, required};

/// Register a QR code for an event. Registering the same pair again succeeds.
///
/// # Endpoint
///
/// ```text
/// POST /event/add
/// ```
///
/// # Request Body
///
/// ```json
/// {"eventName": "Gig", "qrCode": "..."}
/// ```
pub async fn add_event(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> WebResult<Created> {
    let payload = validate(&body, required::EVENT_CODE)?;

    state
        .service()
        .register_event(
            payload.required(fields::EVENT_NAME)?,
            payload.required(fields::QR_CODE)?,
        )
        .await?;
    Ok(Created)
}

/// Whether a QR code is registered for an event.
///
/// # Endpoint
///
/// ```text
/// GET /event/query?eventName=Gig&qrCode=...
/// ```
///
/// # Response
///
/// ```json
/// {"result": true}
/// ```
pub async fn query_event(
    State(state): State<AppState>,
    QueryPayload(query): QueryPayload,
) -> WebResult<Flag> {
    let payload = validate(&query, required::EVENT_CODE)?;

    let registered = state
        .service()
        .check_event_code(
            payload.required(fields::EVENT_NAME)?,
            payload.required(fields::QR_CODE)?,
        )
        .await?;
    Ok(Flag(registered))
}
