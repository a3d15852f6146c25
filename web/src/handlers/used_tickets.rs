//! Redemption routes.

use crate::WebResult;
use crate::extractors::{JsonPayload, QueryPayload};
use crate::response::{Created, Flag};
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use ticket_chain_core::validation::{fields, required};
use ticket_chain_core::{Redemption, validate};

/// Redeem a ticket at the door.
///
/// # Endpoint
///
/// ```text
/// POST /usedTicket/add
/// ```
///
/// # Request Body
///
/// ```json
/// {
///   "userAddress": "alice",
///   "contractAddress": "0xA",
///   "ticketId": "T1",
///   "eventName": "Gig",
///   "qrCode": "..."
/// }
/// ```
///
/// # Responses
///
/// - 201 `{"result": "success"}`
/// - 400 when a field is missing
/// - 404 when the ticket was never issued
/// - 409 when the ticket was already redeemed
pub async fn redeem_ticket(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> WebResult<Created> {
    let payload = validate(&body, required::REDEMPTION)?;
    let redemption = Redemption::from_payload(&payload)?;

    state.service().redeem_ticket(redemption).await?;
    Ok(Created)
}

/// Validate a redemption, or list a holder's redemptions.
///
/// # Endpoint
///
/// ```text
/// GET /usedTicket/query?userAddress=alice&eventName=Gig&qrCode=...
/// GET /usedTicket/query?userAddress=alice
/// ```
///
/// # Responses
///
/// - 200 `{"result": <bool>}` when `eventName` and `qrCode` are both given
/// - 200 `{"result": false}` when only one of them is given
/// - 200 `[{"eventName", "qrCode", "userAddress"}, ...]` when neither is given
/// - 400 when `userAddress` is missing
pub async fn query_used_tickets(
    State(state): State<AppState>,
    QueryPayload(query): QueryPayload,
) -> WebResult<Response> {
    let payload = validate(&query, required::OWNER_QUERY)?;
    let user_address = payload.required(fields::USER_ADDRESS)?;

    match (
        payload.field(fields::EVENT_NAME),
        payload.field(fields::QR_CODE),
    ) {
        (Some(event_name), Some(qr_code)) => {
            let valid = state
                .service()
                .validate_redemption(user_address, event_name, qr_code)
                .await?;
            Ok(Flag(valid).into_response())
        }
        (None, None) => {
            let redemptions = state.service().query_redemptions(user_address).await?;
            Ok(Json(redemptions).into_response())
        }
        _ => Ok(Flag(false).into_response()),
    }
}
