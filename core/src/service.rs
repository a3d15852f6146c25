//! Ticket lifecycle service.
//!
//! Owns the three collections of the ticket workflow and implements every
//! lifecycle operation on top of an injected [`DocumentStore`]:
//!
//! ```text
//!  add_ticket ──▶ [newTicket] ──update_ticket_owner──▶ [newTicket]
//!                      │
//!                redeem_ticket (atomic move)
//!                      ▼
//!                [usedTicket] ◀── validate_redemption / query_redemptions
//! ```
//!
//! Every store call runs under a per-operation timeout. Expiry surfaces as
//! [`TicketError::Timeout`] instead of holding the request open.

use crate::document::{Filter, filter, from_document, to_document};
use crate::environment::{Clock, SystemClock};
use crate::error::{Result, TicketError};
use crate::metrics::{
    REDEMPTION_CHECKS, REDEMPTIONS, STORE_OPERATION_DURATION, STORE_TIMEOUTS, TICKET_TRANSFERS,
    TICKETS_ADDED,
};
use crate::qr::QrCodeEncoding;
use crate::store::{Collection, DocumentStore, StoreFuture};
use crate::ticket::{EventRecord, Redemption, RedemptionView, Ticket, TicketKey, UsedTicketRecord};
use crate::validation::fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default budget for a single store operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Database and collection names used by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLayout {
    /// Logical database holding all collections
    pub database: String,
    /// Collection of unused tickets
    pub new_tickets: String,
    /// Collection of redemption records
    pub used_tickets: String,
    /// Collection of event QR code registrations
    pub events: String,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            database: "ticket_chain_store".to_string(),
            new_tickets: "newTicket".to_string(),
            used_tickets: "usedTicket".to_string(),
            events: "events".to_string(),
        }
    }
}

/// Number of documents removed per collection by [`TicketService::reset_store`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSummary {
    /// Unused tickets removed
    pub new_tickets: u64,
    /// Redemption records removed
    pub used_tickets: u64,
    /// Event registrations removed
    pub events: u64,
}

/// The ticket lifecycle: issue, query, transfer, redeem, validate.
///
/// Cheap to share behind an `Arc`; holds no per-request state.
pub struct TicketService {
    new_tickets: Collection,
    used_tickets: Collection,
    events: Collection,
    qr_encoding: QrCodeEncoding,
    operation_timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl TicketService {
    /// Creates a service over `store` using the collections named by `layout`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, layout: &StoreLayout) -> Self {
        Self {
            new_tickets: Collection::new(store.clone(), &layout.database, &layout.new_tickets),
            used_tickets: Collection::new(store.clone(), &layout.database, &layout.used_tickets),
            events: Collection::new(store, &layout.database, &layout.events),
            qr_encoding: QrCodeEncoding::default(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets how QR codes are stored and compared.
    #[must_use]
    pub const fn with_qr_encoding(mut self, encoding: QrCodeEncoding) -> Self {
        self.qr_encoding = encoding;
        self
    }

    /// Sets the budget for each store operation.
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Replaces the clock used to stamp redemptions.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The configured QR code encoding.
    #[must_use]
    pub const fn qr_encoding(&self) -> QrCodeEncoding {
        self.qr_encoding
    }

    /// Issues a new unused ticket.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Conflict`] if the key exists as unused or used
    /// - [`TicketError::Timeout`] / [`TicketError::Store`] on store failure
    #[tracing::instrument(skip(self, ticket), fields(ticket = %ticket.key()))]
    pub async fn add_ticket(&self, ticket: Ticket) -> Result<()> {
        let key = ticket.key();
        let document = to_document(&ticket)?;
        let probe = key_filter(&key);
        let probes = vec![
            (self.new_tickets.namespace().clone(), probe.clone()),
            (self.used_tickets.namespace().clone(), probe),
        ];

        let inserted = self
            .guarded(
                "insert_unless_exists",
                self.new_tickets.insert_unless_exists(document, probes),
            )
            .await?;
        if !inserted {
            tracing::warn!("Rejected duplicate ticket");
            return Err(TicketError::Conflict(key));
        }

        metrics::counter!(TICKETS_ADDED).increment(1);
        tracing::info!(event_name = %ticket.event_name, "Ticket added");
        Ok(())
    }

    /// Lists unused tickets held by `user_address`, optionally for one event.
    ///
    /// Unbounded; order follows insertion.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Timeout`] / [`TicketError::Store`] on store failure.
    #[tracing::instrument(skip(self))]
    pub async fn query_tickets(
        &self,
        user_address: &str,
        event_name: Option<&str>,
    ) -> Result<Vec<Ticket>> {
        let mut query = filter([(fields::USER_ADDRESS, user_address)]);
        if let Some(event_name) = event_name {
            query.insert(
                fields::EVENT_NAME.to_string(),
                Value::String(event_name.to_string()),
            );
        }

        let documents = self.guarded("find", self.new_tickets.find(query)).await?;
        let tickets = documents
            .into_iter()
            .map(from_document)
            .collect::<std::result::Result<Vec<Ticket>, _>>()?;

        tracing::debug!(count = tickets.len(), "Tickets queried");
        Ok(tickets)
    }

    /// Transfers an unused ticket to `new_owner`.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] if no unused ticket has this key
    /// - [`TicketError::Timeout`] / [`TicketError::Store`] on store failure
    #[tracing::instrument(skip(self), fields(ticket = %key))]
    pub async fn update_ticket_owner(&self, key: &TicketKey, new_owner: &str) -> Result<()> {
        let set = filter([(fields::USER_ADDRESS, new_owner)]);
        let matched = self
            .guarded("update_one", self.new_tickets.update_one(key_filter(key), set))
            .await?;
        if matched == 0 {
            tracing::warn!("Ownership update for unknown ticket");
            return Err(TicketError::NotFound(key.clone()));
        }

        metrics::counter!(TICKET_TRANSFERS).increment(1);
        tracing::info!("Ticket ownership updated");
        Ok(())
    }

    /// Redeems a ticket: removes it from the unused collection and records the
    /// redemption, as one atomic step.
    ///
    /// Only the current holder can redeem, and only for the event the ticket
    /// was issued for. Of several concurrent redemptions of the same ticket
    /// exactly one succeeds.
    ///
    /// # Errors
    ///
    /// - [`TicketError::AlreadyRedeemed`] if a redemption record for the ticket exists
    /// - [`TicketError::NotFound`] if no unused ticket with this key is held by
    ///   the redeeming user for the named event
    /// - [`TicketError::Timeout`] / [`TicketError::Store`] on store failure
    #[tracing::instrument(skip(self, redemption), fields(ticket = %redemption.key))]
    pub async fn redeem_ticket(&self, redemption: Redemption) -> Result<()> {
        let Redemption {
            user_address,
            key,
            event_name,
            qr_code,
        } = redemption;

        let record = UsedTicketRecord {
            user_address,
            event_name,
            qr_code: self.qr_encoding.encode(&qr_code),
            contract_address: key.contract_address.clone(),
            ticket_id: key.ticket_id.clone(),
            redeemed_at: self.clock.now(),
        };
        let document = to_document(&record)?;

        let held = held_filter(&key, &record.user_address, &record.event_name);
        let moved = self
            .guarded(
                "move_one",
                self.new_tickets.move_one(held, &self.used_tickets, document),
            )
            .await?;
        if moved {
            metrics::counter!(REDEMPTIONS, "outcome" => "redeemed").increment(1);
            tracing::info!("Ticket redeemed");
            return Ok(());
        }

        let previous = self
            .guarded("find_one", self.used_tickets.find_one(key_filter(&key)))
            .await?;
        if previous.is_some() {
            metrics::counter!(REDEMPTIONS, "outcome" => "already_redeemed").increment(1);
            tracing::warn!("Ticket already redeemed");
            Err(TicketError::AlreadyRedeemed(key))
        } else {
            metrics::counter!(REDEMPTIONS, "outcome" => "not_found").increment(1);
            tracing::warn!("Redemption for a ticket not held by this user for this event");
            Err(TicketError::NotFound(key))
        }
    }

    /// Whether a redemption record matches all three fields exactly.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Timeout`] / [`TicketError::Store`] on store failure.
    #[tracing::instrument(skip(self, qr_code))]
    pub async fn validate_redemption(
        &self,
        user_address: &str,
        event_name: &str,
        qr_code: &str,
    ) -> Result<bool> {
        let encoded = self.qr_encoding.encode(qr_code);
        let query = filter([
            (fields::USER_ADDRESS, user_address),
            (fields::EVENT_NAME, event_name),
            (fields::QR_CODE, encoded.as_str()),
        ]);

        let valid = self
            .guarded("find_one", self.used_tickets.find_one(query))
            .await?
            .is_some();

        let label = if valid { "true" } else { "false" };
        metrics::counter!(REDEMPTION_CHECKS, "valid" => label).increment(1);
        tracing::debug!(valid, "Redemption validated");
        Ok(valid)
    }

    /// Lists redemption records of `user_address`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Timeout`] / [`TicketError::Store`] on store failure.
    #[tracing::instrument(skip(self))]
    pub async fn query_redemptions(&self, user_address: &str) -> Result<Vec<RedemptionView>> {
        let documents = self
            .guarded(
                "find",
                self.used_tickets
                    .find(filter([(fields::USER_ADDRESS, user_address)])),
            )
            .await?;

        Ok(documents
            .into_iter()
            .map(from_document)
            .collect::<std::result::Result<Vec<RedemptionView>, _>>()?)
    }

    /// Registers a QR code for an event. Registering the same pair twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Timeout`] / [`TicketError::Store`] on store failure.
    #[tracing::instrument(skip(self, qr_code))]
    pub async fn register_event(&self, event_name: &str, qr_code: &str) -> Result<()> {
        let record = EventRecord {
            event_name: event_name.to_string(),
            qr_code: self.qr_encoding.encode(qr_code),
        };
        let probe = filter([
            (fields::EVENT_NAME, record.event_name.as_str()),
            (fields::QR_CODE, record.qr_code.as_str()),
        ]);
        let document = to_document(&record)?;

        let inserted = self
            .guarded(
                "insert_unless_exists",
                self.events
                    .insert_unless_exists(document, vec![(self.events.namespace().clone(), probe)]),
            )
            .await?;

        tracing::info!(inserted, "Event code registered");
        Ok(())
    }

    /// Whether `qr_code` is registered for `event_name`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Timeout`] / [`TicketError::Store`] on store failure.
    #[tracing::instrument(skip(self, qr_code))]
    pub async fn check_event_code(&self, event_name: &str, qr_code: &str) -> Result<bool> {
        let encoded = self.qr_encoding.encode(qr_code);
        let query = filter([
            (fields::EVENT_NAME, event_name),
            (fields::QR_CODE, encoded.as_str()),
        ]);

        Ok(self
            .guarded("find_one", self.events.find_one(query))
            .await?
            .is_some())
    }

    /// Deletes every document of the ticket workflow. Administrative use only.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Timeout`] / [`TicketError::Store`] on store failure.
    #[tracing::instrument(skip(self))]
    pub async fn reset_store(&self) -> Result<ResetSummary> {
        let summary = ResetSummary {
            new_tickets: self
                .guarded("delete_all", self.new_tickets.delete_all())
                .await?,
            used_tickets: self
                .guarded("delete_all", self.used_tickets.delete_all())
                .await?,
            events: self.guarded("delete_all", self.events.delete_all()).await?,
        };

        tracing::warn!(
            new_tickets = summary.new_tickets,
            used_tickets = summary.used_tickets,
            events = summary.events,
            "Ticket store reset"
        );
        Ok(summary)
    }

    /// Checks that the document store answers within the operation budget.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Timeout`] / [`TicketError::Store`] on store failure.
    pub async fn ping(&self) -> Result<()> {
        self.guarded("ping", self.new_tickets.ping()).await
    }

    /// Runs one store call under the operation timeout and records its latency.
    async fn guarded<T>(&self, operation: &'static str, call: StoreFuture<'_, T>) -> Result<T> {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.operation_timeout, call).await;
        metrics::histogram!(STORE_OPERATION_DURATION, "operation" => operation)
            .record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                tracing::error!(operation, error = %error, "Document store operation failed");
                Err(TicketError::Store(error))
            }
            Err(_) => {
                metrics::counter!(STORE_TIMEOUTS, "operation" => operation).increment(1);
                tracing::error!(
                    operation,
                    timeout_ms = u64::try_from(self.operation_timeout.as_millis()).unwrap_or(u64::MAX),
                    "Document store operation timed out"
                );
                Err(TicketError::Timeout {
                    operation,
                    timeout: self.operation_timeout,
                })
            }
        }
    }
}

fn key_filter(key: &TicketKey) -> Filter {
    filter([
        (fields::CONTRACT_ADDRESS, key.contract_address.as_str()),
        (fields::TICKET_ID, key.ticket_id.as_str()),
    ])
}

fn held_filter(key: &TicketKey, user_address: &str, event_name: &str) -> Filter {
    filter([
        (fields::CONTRACT_ADDRESS, key.contract_address.as_str()),
        (fields::TICKET_ID, key.ticket_id.as_str()),
        (fields::USER_ADDRESS, user_address),
        (fields::EVENT_NAME, event_name),
    ])
}
