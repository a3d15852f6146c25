//! Axum HTTP surface for the Ticket Chain backend.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Extract** the JSON body or query string as untyped JSON
//! 3. **Validate** required fields for the operation
//! 4. **Call** the `TicketService`
//! 5. **Map** the outcome to a status code and JSON body
//!
//! # Example
//!
//! ```ignore
//! use ticket_chain_web::{AppState, build_router};
//!
//! let state = AppState::new(Arc::new(service)).with_admin_token(config.admin_token);
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{AdminBearer, CorrelationId, JsonPayload, QueryPayload};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
