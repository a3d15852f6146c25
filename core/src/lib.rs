//! # Ticket Chain Core
//!
//! Domain types, request validation and the ticket lifecycle service.
//!
//! ## Components
//!
//! - [`store`]: the [`DocumentStore`] gateway trait and [`Collection`] handles
//! - [`validation`]: required-field checks on inbound payloads
//! - [`service`]: [`TicketService`], the add / query / transfer / redeem workflow
//!
//! ## Flow
//!
//! ```text
//! payload ──▶ validate() ──▶ TicketService ──▶ DocumentStore
//!                               │
//!                               ▼
//!                     Result<T, TicketError>
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use ticket_chain_core::{StoreLayout, Ticket, TicketService};
//! use std::sync::Arc;
//!
//! let service = TicketService::new(Arc::new(store), &StoreLayout::default());
//! service.add_ticket(Ticket::new("0xA", "Gig", "alice", "T1")).await?;
//! let tickets = service.query_tickets("alice", None).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod qr;
pub mod service;
pub mod store;
pub mod ticket;
pub mod validation;

pub use document::{Document, Filter, Namespace};
pub use environment::{Clock, SystemClock};
pub use error::TicketError;
pub use qr::QrCodeEncoding;
pub use service::{ResetSummary, StoreLayout, TicketService};
pub use store::{Collection, DocumentStore, StoreError, StoreFuture};
pub use ticket::{EventRecord, Redemption, RedemptionView, Ticket, TicketKey, UsedTicketRecord};
pub use validation::{ValidatedPayload, ValidationError, validate};
