//! Unused-ticket routes: issue, list, transfer.

use crate::WebResult;
use crate::extractors::{JsonPayload, QueryPayload};
use crate::response::Created;
use crate::state::AppState;
use axum::{Json, extract::State};
use ticket_chain_core::validation::{fields, required};
use ticket_chain_core::{Ticket, validate};

/// Issue a new ticket.
///
/// # Endpoint
///
/// ```text
/// POST /ticket/add
/// ```
///
/// # Request Body
///
/// ```json
/// {
///   "contractAddress": "0xA",
///   "eventName": "Gig",
///   "userAddress": "alice",
///   "ticketId": "T1"
/// }
/// ```
///
/// # Responses
///
/// - 201 `{"result": "success"}`
/// - 400 when a field is missing
/// - 409 when the ticket was already issued
pub async fn add_ticket(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> WebResult<Created> {
    let payload = validate(&body, required::TICKET)?;
    let ticket = Ticket::from_payload(&payload)?;

    state.service().add_ticket(ticket).await?;
    Ok(Created)
}

/// List the unused tickets of a holder.
///
/// # Endpoint
///
/// ```text
/// GET /ticket/query?userAddress=alice[&eventName=Gig]
/// ```
///
/// # Response
///
/// ```json
/// [
///   {"contractAddress": "0xA", "eventName": "Gig", "userAddress": "alice", "ticketId": "T1"}
/// ]
/// ```
pub async fn query_tickets(
    State(state): State<AppState>,
    QueryPayload(query): QueryPayload,
) -> WebResult<Json<Vec<Ticket>>> {
    let payload = validate(&query, required::OWNER_QUERY)?;
    let user_address = payload.required(fields::USER_ADDRESS)?;

    let tickets = state
        .service()
        .query_tickets(user_address, payload.field(fields::EVENT_NAME))
        .await?;
    Ok(Json(tickets))
}

/// Transfer a ticket to the `userAddress` given in the body.
///
/// The ticket is identified by `contractAddress` and `ticketId`.
///
/// # Endpoint
///
/// ```text
/// PUT /ticket/update
/// ```
///
/// # Responses
///
/// - 201 `{"result": "success"}`
/// - 400 when a field is missing
/// - 404 when no unused ticket matches
pub async fn update_ticket(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> WebResult<Created> {
    let payload = validate(&body, required::TICKET)?;
    let ticket = Ticket::from_payload(&payload)?;

    state
        .service()
        .update_ticket_owner(&ticket.key(), &ticket.user_address)
        .await?;
    Ok(Created)
}
