//! `PostgreSQL` implementation of [`DocumentStore`].
//!
//! Every collection lives in one `documents` table, keyed by
//! `(database_name, collection_name)`. Bodies are JSONB and filters are
//! evaluated with the containment operator (`body @> filter`), which for flat
//! documents is exact equality on each filter field.
//!
//! Compound writes run in a transaction:
//! - `move_one` deletes the source row under `FOR UPDATE` and inserts the
//!   replacement, so concurrent movers of the same row see it at most once.
//! - `insert_unless_exists` serializes on a transaction-scoped advisory lock
//!   derived from its probes before checking them.

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use ticket_chain_core::document::{Document, Filter, Namespace};
use ticket_chain_core::store::{DocumentStore, StoreError, StoreFuture};

use crate::credentials::PoolSettings;

/// Document store backed by a `PostgreSQL` connection pool.
///
/// # Example
///
/// ```no_run
/// use ticket_chain_postgres::{PoolSettings, PostgresDocumentStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = PostgresDocumentStore::connect(
///     "postgres://localhost/tickets",
///     &PoolSettings::default(),
/// )
/// .await?;
/// store.migrate().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if the database cannot be reached.
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.connect_timeout)
            .idle_timeout(settings.idle_timeout)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Configuration(format!("Failed to connect: {e}")))?;

        tracing::info!(
            max_connections = settings.max_connections,
            "Connected to document database"
        );
        Ok(Self::from_pool(pool))
    }

    /// Creates the `documents` table and its indexes if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Configuration(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn as_json(map: Filter) -> Json<Document> {
    Json(map)
}

/// Stable text identifying a set of probes, used as the advisory lock key.
fn probe_lock_key(probes: &[(Namespace, Filter)]) -> String {
    probes
        .iter()
        .map(|(ns, filter)| format!("{ns}:{}", serde_json::Value::Object(filter.clone())))
        .collect::<Vec<_>>()
        .join("|")
}

impl DocumentStore for PostgresDocumentStore {
    fn insert_one(&self, ns: Namespace, document: Document) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO documents (database_name, collection_name, body) VALUES ($1, $2, $3)",
            )
            .bind(ns.database())
            .bind(ns.collection())
            .bind(as_json(document))
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to insert into {ns}: {e}")))?;
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
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| StoreError::Database(format!("Failed to begin transaction: {e}")))?;

            sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
                .bind(probe_lock_key(&probes))
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Database(format!("Failed to acquire lock: {e}")))?;

            for (probe_ns, probe) in probes {
                let exists: bool = sqlx::query_scalar(
                    "SELECT EXISTS (
                         SELECT 1 FROM documents
                         WHERE database_name = $1 AND collection_name = $2 AND body @> $3
                     )",
                )
                .bind(probe_ns.database())
                .bind(probe_ns.collection())
                .bind(as_json(probe))
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| StoreError::Database(format!("Failed to probe {probe_ns}: {e}")))?;

                if exists {
                    tracing::debug!(probe = %probe_ns, "Insert skipped, matching document exists");
                    return Ok(false);
                }
            }

            sqlx::query(
                "INSERT INTO documents (database_name, collection_name, body) VALUES ($1, $2, $3)",
            )
            .bind(ns.database())
            .bind(ns.collection())
            .bind(as_json(document))
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to insert into {ns}: {e}")))?;

            tx.commit()
                .await
                .map_err(|e| StoreError::Database(format!("Failed to commit insert: {e}")))?;
            Ok(true)
        })
    }

    fn find(&self, ns: Namespace, filter: Filter) -> StoreFuture<'_, Vec<Document>> {
        Box::pin(async move {
            let rows: Vec<Json<Document>> = sqlx::query_scalar(
                "SELECT body FROM documents
                 WHERE database_name = $1 AND collection_name = $2 AND body @> $3
                 ORDER BY id",
            )
            .bind(ns.database())
            .bind(ns.collection())
            .bind(as_json(filter))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to query {ns}: {e}")))?;

            Ok(rows.into_iter().map(|Json(body)| body).collect())
        })
    }

    fn find_one(&self, ns: Namespace, filter: Filter) -> StoreFuture<'_, Option<Document>> {
        Box::pin(async move {
            let row: Option<Json<Document>> = sqlx::query_scalar(
                "SELECT body FROM documents
                 WHERE database_name = $1 AND collection_name = $2 AND body @> $3
                 ORDER BY id
                 LIMIT 1",
            )
            .bind(ns.database())
            .bind(ns.collection())
            .bind(as_json(filter))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to query {ns}: {e}")))?;

            Ok(row.map(|Json(body)| body))
        })
    }

    fn update_one(&self, ns: Namespace, filter: Filter, set: Document) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE documents SET body = body || $4
                 WHERE id = (
                     SELECT id FROM documents
                     WHERE database_name = $1 AND collection_name = $2 AND body @> $3
                     ORDER BY id
                     LIMIT 1
                     FOR UPDATE
                 )",
            )
            .bind(ns.database())
            .bind(ns.collection())
            .bind(as_json(filter))
            .bind(as_json(set))
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to update {ns}: {e}")))?;

            Ok(result.rows_affected())
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
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| StoreError::Database(format!("Failed to begin transaction: {e}")))?;

            let removed: Option<i64> = sqlx::query_scalar(
                "DELETE FROM documents
                 WHERE id = (
                     SELECT id FROM documents
                     WHERE database_name = $1 AND collection_name = $2 AND body @> $3
                     ORDER BY id
                     LIMIT 1
                     FOR UPDATE
                 )
                 RETURNING id",
            )
            .bind(from.database())
            .bind(from.collection())
            .bind(as_json(filter))
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to remove from {from}: {e}")))?;

            if removed.is_none() {
                return Ok(false);
            }

            sqlx::query(
                "INSERT INTO documents (database_name, collection_name, body) VALUES ($1, $2, $3)",
            )
            .bind(to.database())
            .bind(to.collection())
            .bind(as_json(document))
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to insert into {to}: {e}")))?;

            tx.commit()
                .await
                .map_err(|e| StoreError::Database(format!("Failed to commit move: {e}")))?;

            tracing::debug!(from = %from, to = %to, "Document moved");
            Ok(true)
        })
    }

    fn delete_all(&self, ns: Namespace) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let result =
                sqlx::query("DELETE FROM documents WHERE database_name = $1 AND collection_name = $2")
                    .bind(ns.database())
                    .bind(ns.collection())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| StoreError::Database(format!("Failed to clear {ns}: {e}")))?;

            Ok(result.rows_affected())
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Database(format!("Ping failed: {e}")))?;
            Ok(())
        })
    }
}
