//! Ticket Chain HTTP router.
//!
//! Composes every handler into one Axum router with the shared middleware
//! stack (correlation IDs, request tracing, permissive CORS for the browser
//! client).

use crate::handlers::{admin, events, health, tickets, used_tickets};
use crate::middleware::correlation_id;
use crate::state::AppState;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the router with all endpoints.
///
/// # Routes
///
/// - `POST /ticket/add` - Issue a ticket
/// - `GET /ticket/query` - List a holder's unused tickets
/// - `PUT /ticket/update` - Transfer a ticket
/// - `POST /usedTicket/add` - Redeem a ticket
/// - `GET /usedTicket/query` - Validate or list redemptions
/// - `POST /event/add` - Register an event QR code
/// - `GET /event/query` - Check an event QR code
/// - `GET /resetDatabase` - Delete everything (admin token required)
/// - `GET /health`, `GET /ready`, `GET /metrics`
///
/// `/usedticket/*` are accepted as lower-case aliases of `/usedTicket/*`.
///
/// # Example
///
/// ```rust,ignore
/// let app = build_router(AppState::new(Arc::new(service)));
/// axum::serve(listener, app).await?;
/// ```
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ticket/add", post(tickets::add_ticket))
        .route("/ticket/query", get(tickets::query_tickets))
        .route("/ticket/update", put(tickets::update_ticket))
        .route("/usedTicket/add", post(used_tickets::redeem_ticket))
        .route("/usedTicket/query", get(used_tickets::query_used_tickets))
        .route("/usedticket/add", post(used_tickets::redeem_ticket))
        .route("/usedticket/query", get(used_tickets::query_used_tickets))
        .route("/event/add", post(events::add_event))
        .route("/event/query", get(events::query_event))
        .route("/resetDatabase", get(admin::reset_database))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(from_fn(correlation_id))
}
