//! # Ticket Chain Testing
//!
//! Testing utilities for the Ticket Chain workspace.
//!
//! This crate provides:
//! - [`InMemoryDocumentStore`]: a `HashMap`-backed `DocumentStore`
//! - [`FixedClock`]: deterministic time for redemption timestamps
//! - [`fixtures`]: sample tickets and a ready-made service
//!
//! ## Example
//!
//! ```
//! use ticket_chain_testing::{InMemoryDocumentStore, fixtures};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryDocumentStore::new();
//! let service = fixtures::service(&store);
//!
//! service.add_ticket(fixtures::ticket("alice", "T1")).await?;
//! assert_eq!(service.query_tickets("alice", None).await?.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod document_store;

pub use document_store::InMemoryDocumentStore;

use chrono::{DateTime, Utc};
use ticket_chain_core::environment::Clock;

/// Mock implementations of injected dependencies.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use ticket_chain_testing::mocks::FixedClock;
    /// use ticket_chain_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Sample data and pre-wired services.
pub mod fixtures {
    use super::InMemoryDocumentStore;
    use super::mocks::test_clock;
    use std::sync::Arc;
    use ticket_chain_core::document::Namespace;
    use ticket_chain_core::{Redemption, StoreLayout, Ticket, TicketKey, TicketService};

    /// Contract address used by every fixture ticket.
    pub const CONTRACT: &str = "0xA";
    /// Event name used by every fixture ticket.
    pub const EVENT: &str = "Gig";

    /// A ticket for [`EVENT`] on [`CONTRACT`].
    #[must_use]
    pub fn ticket(owner: &str, ticket_id: &str) -> Ticket {
        Ticket::new(CONTRACT, EVENT, owner, ticket_id)
    }

    /// A redemption of `ticket_id` by `owner` with the given QR code.
    #[must_use]
    pub fn redemption(owner: &str, ticket_id: &str, qr_code: &str) -> Redemption {
        Redemption {
            user_address: owner.to_string(),
            key: TicketKey::new(CONTRACT, ticket_id),
            event_name: EVENT.to_string(),
            qr_code: qr_code.to_string(),
        }
    }

    /// Namespaces of the default layout: `(new tickets, used tickets, events)`.
    #[must_use]
    pub fn namespaces() -> (Namespace, Namespace, Namespace) {
        let layout = StoreLayout::default();
        (
            Namespace::new(&layout.database, &layout.new_tickets),
            Namespace::new(&layout.database, &layout.used_tickets),
            Namespace::new(&layout.database, &layout.events),
        )
    }

    /// A service over `store` with the default layout and QR encoding and a
    /// fixed clock.
    #[must_use]
    pub fn service(store: &InMemoryDocumentStore) -> TicketService {
        TicketService::new(Arc::new(store.clone()), &StoreLayout::default())
            .with_clock(Arc::new(test_clock()))
    }
}

/// Installs a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; output is captured by the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
