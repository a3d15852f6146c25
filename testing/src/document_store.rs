//! In-memory document store for fast, deterministic testing.
//!
//! [`InMemoryDocumentStore`] implements [`DocumentStore`] over a `HashMap` of
//! collections behind a single lock, so every operation (including the
//! compound ones) is trivially atomic. It can also simulate latency and
//! outages to exercise timeout and error paths.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use ticket_chain_core::document::{Document, Filter, Namespace, matches};
use ticket_chain_core::store::{DocumentStore, StoreError, StoreFuture};

/// In-memory [`DocumentStore`].
///
/// Clones share the same data, so a test can keep a handle for assertions
/// while the service owns another.
///
/// # Example
///
/// ```
/// use ticket_chain_testing::InMemoryDocumentStore;
/// use ticket_chain_core::document::{Namespace, filter};
/// use ticket_chain_core::store::DocumentStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryDocumentStore::new();
/// let ns = Namespace::new("db", "newTicket");
///
/// store.insert_one(ns.clone(), filter([("ticketId", "T1")])).await?;
/// assert_eq!(store.count(&ns), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<Namespace, Vec<Document>>>>,
    latency: Option<Duration>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every operation by `latency` before it touches the data.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent operation fail with [`StoreError::Database`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of a collection's documents in insertion order.
    #[must_use]
    pub fn documents(&self, ns: &Namespace) -> Vec<Document> {
        self.collections
            .read()
            .unwrap()
            .get(ns)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn count(&self, ns: &Namespace) -> usize {
        self.collections.read().unwrap().get(ns).map_or(0, Vec::len)
    }

    /// Remove every collection (for test isolation).
    pub fn clear(&self) {
        self.collections.write().unwrap().clear();
    }

    async fn simulate(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn insert_one(&self, ns: Namespace, document: Document) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.simulate().await?;
            self.collections
                .write()
                .unwrap()
                .entry(ns)
                .or_default()
                .push(document);
            Ok(())
        })
    }

    fn insert_unless_exists(
        &self,
        ns: Namespace,
        document: Document,
        probes: Vec<(Namespace, Filter)>,
    ) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            self.simulate().await?;
            let mut collections = self.collections.write().unwrap();
            let exists = probes.iter().any(|(probe_ns, probe)| {
                collections
                    .get(probe_ns)
                    .is_some_and(|docs| docs.iter().any(|d| matches(d, probe)))
            });
            if exists {
                return Ok(false);
            }
            collections.entry(ns).or_default().push(document);
            Ok(true)
        })
    }

    fn find(&self, ns: Namespace, filter: Filter) -> StoreFuture<'_, Vec<Document>> {
        Box::pin(async move {
            self.simulate().await?;
            Ok(self
                .collections
                .read()
                .unwrap()
                .get(&ns)
                .map(|docs| docs.iter().filter(|d| matches(d, &filter)).cloned().collect())
                .unwrap_or_default())
        })
    }

    fn find_one(&self, ns: Namespace, filter: Filter) -> StoreFuture<'_, Option<Document>> {
        Box::pin(async move {
            self.simulate().await?;
            Ok(self
                .collections
                .read()
                .unwrap()
                .get(&ns)
                .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
        })
    }

    fn update_one(&self, ns: Namespace, filter: Filter, set: Document) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            self.simulate().await?;
            let mut collections = self.collections.write().unwrap();
            let target = collections
                .get_mut(&ns)
                .and_then(|docs| docs.iter_mut().find(|d| matches(d, &filter)));
            match target {
                Some(document) => {
                    document.extend(set);
                    Ok(1)
                }
                None => Ok(0),
            }
        })
    }

    fn move_one(
        &self,
        from: Namespace,
        filter: Filter,
        to: Namespace,
        document: Document,
    ) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            self.simulate().await?;
            let mut collections = self.collections.write().unwrap();
            let Some(source) = collections.get_mut(&from) else {
                return Ok(false);
            };
            let Some(position) = source.iter().position(|d| matches(d, &filter)) else {
                return Ok(false);
            };
            source.remove(position);
            collections.entry(to).or_default().push(document);
            Ok(true)
        })
    }

    fn delete_all(&self, ns: Namespace) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            self.simulate().await?;
            let removed = self
                .collections
                .write()
                .unwrap()
                .remove(&ns)
                .map_or(0, |docs| docs.len());
            Ok(removed as u64)
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.simulate().await })
    }
}
