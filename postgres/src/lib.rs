//! `PostgreSQL` document store for Ticket Chain.
//!
//! Implements the `DocumentStore` trait from `ticket-chain-core` on top of a
//! single JSONB table, and loads the credentials file that points the service
//! at its database.
//!
//! # Example
//!
//! ```ignore
//! use ticket_chain_postgres::{Credentials, PoolSettings, PostgresDocumentStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::from_file("credentials/credentials.json")?;
//!     let store =
//!         PostgresDocumentStore::connect(&credentials.connection_url(), &PoolSettings::default())
//!             .await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credentials;
pub mod document_store;

pub use credentials::{Credentials, PoolSettings};
pub use document_store::PostgresDocumentStore;
