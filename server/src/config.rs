//! Configuration for the Ticket Chain server.
//!
//! Every value comes from an environment variable with a default; a `.env`
//! file is loaded by the binary before [`Config::from_env`] runs.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use ticket_chain_core::{QrCodeEncoding, StoreLayout};
use ticket_chain_postgres::PoolSettings;

/// Configuration that cannot be used to start the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used.
    #[error("Invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        /// Variable (or argument) name
        key: &'static str,
        /// Rejected value
        value: String,
        /// What was expected instead
        reason: String,
    },
}

/// Server configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Document store configuration
    pub store: StoreConfig,
    /// Ticket service configuration
    pub service: ServiceConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
}

/// Document store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Path of the JSON credentials file
    pub credentials_path: PathBuf,
    /// Maximum pool connections
    pub max_connections: u32,
    /// Minimum idle pool connections
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
    /// Idle connection timeout in seconds (0 disables)
    pub idle_timeout: u64,
    /// Database and collection names
    pub layout: StoreLayout,
}

/// Ticket service configuration.
#[derive(Clone)]
pub struct ServiceConfig {
    /// QR code storage encoding
    pub qr_code_encoding: QrCodeEncoding,
    /// Per-operation store budget in milliseconds
    pub operation_timeout_ms: u64,
    /// Bearer token for administrative routes
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("qr_code_encoding", &self.qr_code_encoding)
            .field("operation_timeout_ms", &self.operation_timeout_ms)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// HTTP server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Seconds to wait for the pool to drain on shutdown
    pub shutdown_timeout: u64,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `PORT` or `QR_CODE_ENCODING` is set to an
    /// unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Malformed numeric tuning values fall back to their defaults, as does a
    /// zero store operation timeout. The port and QR encoding are parsed
    /// strictly.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `PORT` or `QR_CODE_ENCODING` is set to an
    /// unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_or = |key: &str, default: u64| {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };
        let positive_or = |key: &str, default: u64| match parse_or(key, default) {
            0 => default,
            value => value,
        };
        let string_or = |key: &str, default: String| {
            lookup(key)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(default)
        };

        let defaults = StoreLayout::default();
        let layout = StoreLayout {
            database: string_or("STORE_DATABASE", defaults.database),
            new_tickets: string_or("NEW_TICKET_COLLECTION", defaults.new_tickets),
            used_tickets: string_or("USED_TICKET_COLLECTION", defaults.used_tickets),
            events: string_or("EVENT_COLLECTION", defaults.events),
        };

        let qr_code_encoding = match lookup("QR_CODE_ENCODING") {
            Some(raw) => raw.parse().map_err(|e: ticket_chain_core::qr::UnknownEncoding| {
                ConfigError::InvalidValue {
                    key: "QR_CODE_ENCODING",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => QrCodeEncoding::default(),
        };

        let port = match lookup("PORT") {
            Some(raw) => parse_port("PORT", &raw)?,
            None => 2122,
        };

        Ok(Self {
            store: StoreConfig {
                credentials_path: PathBuf::from(string_or(
                    "CREDENTIALS_PATH",
                    "credentials/credentials.json".to_string(),
                )),
                max_connections: u32::try_from(parse_or("DATABASE_MAX_CONNECTIONS", 10))
                    .unwrap_or(10),
                min_connections: u32::try_from(parse_or("DATABASE_MIN_CONNECTIONS", 1))
                    .unwrap_or(1),
                connect_timeout: parse_or("DATABASE_CONNECT_TIMEOUT", 30),
                idle_timeout: parse_or("DATABASE_IDLE_TIMEOUT", 600),
                layout,
            },
            service: ServiceConfig {
                qr_code_encoding,
                operation_timeout_ms: positive_or("STORE_OPERATION_TIMEOUT_MS", 5000),
                admin_token: lookup("ADMIN_TOKEN")
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
            },
            server: ServerConfig {
                host: string_or("HOST", "0.0.0.0".to_string()),
                port,
                shutdown_timeout: parse_or("SHUTDOWN_TIMEOUT", 30),
            },
        })
    }

    /// Override the port with the first positional command-line argument.
    ///
    /// `args` excludes the program name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the argument is not a valid port.
    pub fn apply_args<I>(&mut self, args: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        if let Some(raw) = args.into_iter().next() {
            self.server.port = parse_port("port argument", &raw)?;
        }
        Ok(())
    }

    /// Pool settings for the document store.
    #[must_use]
    pub const fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.store.max_connections,
            min_connections: self.store.min_connections,
            connect_timeout: Duration::from_secs(self.store.connect_timeout),
            idle_timeout: if self.store.idle_timeout == 0 {
                None
            } else {
                Some(Duration::from_secs(self.store.idle_timeout))
            },
        }
    }

    /// Per-operation store budget.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.service.operation_timeout_ms)
    }

    /// How long shutdown waits for the connection pool to close.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout)
    }

    /// `host:port` to bind the listener to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_port(key: &'static str, raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected a port number between 1 and 65535".to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:2122");
        assert_eq!(
            config.store.credentials_path,
            PathBuf::from("credentials/credentials.json")
        );
        assert_eq!(config.store.layout, StoreLayout::default());
        assert_eq!(config.service.qr_code_encoding, QrCodeEncoding::Plain);
        assert_eq!(config.operation_timeout(), Duration::from_secs(5));
        assert!(config.service.admin_token.is_none());

        let pool = config.pool_settings();
        assert_eq!(pool.max_connections, 10);
        assert_eq!(pool.min_connections, 1);
        assert_eq!(pool.idle_timeout, Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("STORE_DATABASE", "gigs"),
            ("USED_TICKET_COLLECTION", "redeemed"),
            ("QR_CODE_ENCODING", "sha256"),
            ("STORE_OPERATION_TIMEOUT_MS", "250"),
            ("ADMIN_TOKEN", "s3cret"),
            ("DATABASE_IDLE_TIMEOUT", "0"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.store.layout.database, "gigs");
        assert_eq!(config.store.layout.used_tickets, "redeemed");
        assert_eq!(config.store.layout.new_tickets, "newTicket");
        assert_eq!(config.service.qr_code_encoding, QrCodeEncoding::Sha256);
        assert_eq!(config.operation_timeout(), Duration::from_millis(250));
        assert_eq!(config.service.admin_token.as_deref(), Some("s3cret"));
        assert_eq!(config.pool_settings().idle_timeout, None);
    }

    #[test]
    fn test_malformed_tuning_values_fall_back() {
        let config = config_from(&[
            ("DATABASE_MAX_CONNECTIONS", "many"),
            ("STORE_OPERATION_TIMEOUT_MS", "-1"),
        ])
        .unwrap();

        assert_eq!(config.store.max_connections, 10);
        assert_eq!(config.service.operation_timeout_ms, 5000);
    }

    #[test]
    fn test_zero_operation_timeout_falls_back() {
        let config = config_from(&[("STORE_OPERATION_TIMEOUT_MS", "0")]).unwrap();
        assert_eq!(config.operation_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_unknown_encoding() {
        let err = config_from(&[("QR_CODE_ENCODING", "base64")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "QR_CODE_ENCODING", .. }
        ));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(config_from(&[("PORT", "http")]).is_err());
        assert!(config_from(&[("PORT", "0")]).is_err());
        assert!(config_from(&[("PORT", "70000")]).is_err());
    }

    #[test]
    fn test_empty_admin_token_is_unset() {
        let config = config_from(&[("ADMIN_TOKEN", "  ")]).unwrap();
        assert!(config.service.admin_token.is_none());
    }

    #[test]
    fn test_admin_token_is_trimmed() {
        let config = config_from(&[("ADMIN_TOKEN", " s3cret \n")]).unwrap();
        assert_eq!(config.service.admin_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_port_argument_overrides_env() {
        let mut config = config_from(&[("PORT", "8080")]).unwrap();

        config.apply_args(Vec::new()).unwrap();
        assert_eq!(config.server.port, 8080);

        config.apply_args(vec!["3000".to_string()]).unwrap();
        assert_eq!(config.server.port, 3000);

        assert!(config.apply_args(vec!["--help".to_string()]).is_err());
    }
}
