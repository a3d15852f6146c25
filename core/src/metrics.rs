//! Business metrics for the ticket lifecycle.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `ticket_chain_tickets_added_total` - Tickets issued
//! - `ticket_chain_ticket_transfers_total` - Successful ownership updates
//! - `ticket_chain_redemptions_total{outcome}` - Redemption attempts by outcome
//!   (`redeemed`, `already_redeemed`, `not_found`)
//! - `ticket_chain_redemption_checks_total{valid}` - QR code validation lookups
//! - `ticket_chain_store_timeouts_total{operation}` - Store calls that exceeded their budget
//!
//! ## Histograms
//! - `ticket_chain_store_operation_duration_seconds{operation}` - Store call latency

use metrics::{describe_counter, describe_histogram};

/// Tickets issued.
pub const TICKETS_ADDED: &str = "ticket_chain_tickets_added_total";
/// Successful ownership updates.
pub const TICKET_TRANSFERS: &str = "ticket_chain_ticket_transfers_total";
/// Redemption attempts, labelled by `outcome`.
pub const REDEMPTIONS: &str = "ticket_chain_redemptions_total";
/// QR validation lookups, labelled by `valid`.
pub const REDEMPTION_CHECKS: &str = "ticket_chain_redemption_checks_total";
/// Store calls that timed out, labelled by `operation`.
pub const STORE_TIMEOUTS: &str = "ticket_chain_store_timeouts_total";
/// Store call latency, labelled by `operation`.
pub const STORE_OPERATION_DURATION: &str = "ticket_chain_store_operation_duration_seconds";

/// Registers descriptions for every lifecycle metric.
///
/// Call once at startup, after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(TICKETS_ADDED, "Total number of tickets issued");
    describe_counter!(
        TICKET_TRANSFERS,
        "Total number of ticket ownership transfers"
    );
    describe_counter!(
        REDEMPTIONS,
        "Total number of redemption attempts by outcome (redeemed, already_redeemed, not_found)"
    );
    describe_counter!(
        REDEMPTION_CHECKS,
        "Total number of QR code validation lookups by result"
    );
    describe_counter!(
        STORE_TIMEOUTS,
        "Total number of document store operations that timed out"
    );
    describe_histogram!(
        STORE_OPERATION_DURATION,
        "Time taken by document store operations"
    );

    tracing::info!("Ticket lifecycle metrics registered");
}
