//! Document store gateway abstraction.
//!
//! The [`DocumentStore`] trait is the narrow seam between the ticket lifecycle
//! and the database. It offers exactly the document operations the workflow
//! needs, including two atomic compound writes ([`DocumentStore::move_one`] and
//! [`DocumentStore::insert_unless_exists`]) so that invariants spanning two
//! collections hold under concurrent requests.
//!
//! # Implementations
//!
//! - `PostgresDocumentStore` (in `ticket-chain-postgres`): JSONB documents in `PostgreSQL`
//! - `InMemoryDocumentStore` (in `ticket-chain-testing`): fast, deterministic tests
//!
//! # Dyn Compatibility
//!
//! Methods return boxed futures so the store can be shared as
//! `Arc<dyn DocumentStore>` by every request handler.

use crate::document::{Document, Filter, Namespace};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Boxed future returned by [`DocumentStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors raised by the document store gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Credentials are missing/invalid or the connection could not be established.
    ///
    /// Fatal at startup: the process must not serve traffic.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The database rejected or failed an operation.
    #[error("Database error: {0}")]
    Database(String),

    /// A document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Document database operations used by the ticket lifecycle.
///
/// Filters are exact-equality matches on top-level fields (see
/// [`crate::document::matches`]). Collections come into existence on first
/// write; no operation validates a namespace.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: one instance is shared by all
/// concurrently executing handlers.
pub trait DocumentStore: Send + Sync {
    /// Appends one document to a collection.
    fn insert_one(&self, ns: Namespace, document: Document) -> StoreFuture<'_, ()>;

    /// Inserts `document` unless any of the `probes` matches an existing document.
    ///
    /// The probe checks and the insert happen atomically with respect to other
    /// calls of this method and to [`DocumentStore::move_one`]. Returns `true` if
    /// the document was inserted.
    fn insert_unless_exists(
        &self,
        ns: Namespace,
        document: Document,
        probes: Vec<(Namespace, Filter)>,
    ) -> StoreFuture<'_, bool>;

    /// Returns every document matching `filter`, in insertion order.
    fn find(&self, ns: Namespace, filter: Filter) -> StoreFuture<'_, Vec<Document>>;

    /// Returns the first document matching `filter`, if any.
    fn find_one(&self, ns: Namespace, filter: Filter) -> StoreFuture<'_, Option<Document>>;

    /// Merges `set` into the first document matching `filter`.
    ///
    /// Returns the number of matched documents (0 or 1).
    fn update_one(&self, ns: Namespace, filter: Filter, set: Document) -> StoreFuture<'_, u64>;

    /// Atomically removes the first document matching `filter` from `from` and
    /// inserts `document` into `to`.
    ///
    /// Returns `false` and writes nothing when no document matches. Of several
    /// concurrent calls racing for the same source document, at most one
    /// returns `true`.
    fn move_one(
        &self,
        from: Namespace,
        filter: Filter,
        to: Namespace,
        document: Document,
    ) -> StoreFuture<'_, bool>;

    /// Deletes every document in a collection, returning how many were removed.
    fn delete_all(&self, ns: Namespace) -> StoreFuture<'_, u64>;

    /// Cheap connectivity probe used by readiness checks.
    fn ping(&self) -> StoreFuture<'_, ()>;
}

/// Handle on one collection of a shared [`DocumentStore`].
///
/// Cloning is cheap; all clones talk to the same store.
#[derive(Clone)]
pub struct Collection {
    store: Arc<dyn DocumentStore>,
    ns: Namespace,
}

impl Collection {
    /// Opens `database.collection` on `store`. No validation is performed.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            ns: Namespace::new(database, collection),
        }
    }

    /// The namespace this handle points at.
    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.ns
    }

    /// See [`DocumentStore::insert_one`].
    pub fn insert_one(&self, document: Document) -> StoreFuture<'_, ()> {
        self.store.insert_one(self.ns.clone(), document)
    }

    /// See [`DocumentStore::insert_unless_exists`].
    pub fn insert_unless_exists(
        &self,
        document: Document,
        probes: Vec<(Namespace, Filter)>,
    ) -> StoreFuture<'_, bool> {
        self.store
            .insert_unless_exists(self.ns.clone(), document, probes)
    }

    /// See [`DocumentStore::find`].
    pub fn find(&self, filter: Filter) -> StoreFuture<'_, Vec<Document>> {
        self.store.find(self.ns.clone(), filter)
    }

    /// See [`DocumentStore::find_one`].
    pub fn find_one(&self, filter: Filter) -> StoreFuture<'_, Option<Document>> {
        self.store.find_one(self.ns.clone(), filter)
    }

    /// See [`DocumentStore::update_one`].
    pub fn update_one(&self, filter: Filter, set: Document) -> StoreFuture<'_, u64> {
        self.store.update_one(self.ns.clone(), filter, set)
    }

    /// Moves the first match of `filter` into `to`, replacing it with `document`.
    ///
    /// See [`DocumentStore::move_one`].
    pub fn move_one<'a>(
        &'a self,
        filter: Filter,
        to: &Collection,
        document: Document,
    ) -> StoreFuture<'a, bool> {
        self.store
            .move_one(self.ns.clone(), filter, to.ns.clone(), document)
    }

    /// See [`DocumentStore::delete_all`].
    pub fn delete_all(&self) -> StoreFuture<'_, u64> {
        self.store.delete_all(self.ns.clone())
    }

    /// Pings the underlying store.
    pub fn ping(&self) -> StoreFuture<'_, ()> {
        self.store.ping()
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("ns", &self.ns).finish()
    }
}
