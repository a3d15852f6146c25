//! HTTP handlers.
//!
//! Each handler validates its payload, calls the ticket service and maps the
//! outcome to a response. Handlers hold no state of their own.

pub mod admin;
pub mod events;
pub mod health;
pub mod tickets;
pub mod used_tickets;
