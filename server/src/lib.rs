//! # Ticket Chain Server
//!
//! Process wiring for the Ticket Chain HTTP API: configuration loading and
//! graceful shutdown. The binary in `main.rs` assembles the store, service
//! and router from these pieces.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]

pub mod config;
pub mod shutdown;

pub use config::{Config, ConfigError};
pub use shutdown::shutdown_signal;
