//! Database credentials and pool settings.
//!
//! Credentials live in a JSON file with three required keys:
//!
//! ```json
//! {
//!   "username": "tickets",
//!   "password": "s3cret",
//!   "connection_string": "postgres://{{username}}:{{password}}@db:5432/tickets"
//! }
//! ```
//!
//! The `{{username}}` and `{{password}}` placeholders in `connection_string`
//! are substituted to build the connection URL.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use ticket_chain_core::StoreError;

const USERNAME_PLACEHOLDER: &str = "{{username}}";
const PASSWORD_PLACEHOLDER: &str = "{{password}}";

/// Contents of the credentials file.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    username: String,
    password: String,
    connection_string: String,
}

impl Credentials {
    /// Creates credentials directly (mainly for tests).
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            connection_string: connection_string.into(),
        }
    }

    /// Reads and checks the credentials file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if the file is unreadable, is not
    /// JSON, or lacks any of `username`, `password`, `connection_string`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Configuration(format!(
                "Credentials file {} not readable: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }

    /// Parses credentials from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if a required key is missing,
    /// mistyped or empty.
    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        let credentials: Self = serde_json::from_str(raw)
            .map_err(|e| StoreError::Configuration(format!("Credentials file not valid: {e}")))?;

        let empty: Vec<&str> = [
            ("username", &credentials.username),
            ("password", &credentials.password),
            ("connection_string", &credentials.connection_string),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();
        if !empty.is_empty() {
            return Err(StoreError::Configuration(format!(
                "Credentials file not valid: empty {}",
                empty.join(", ")
            )));
        }
        Ok(credentials)
    }

    /// The database user.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The connection URL with both placeholders substituted.
    #[must_use]
    pub fn connection_url(&self) -> String {
        self.connection_string
            .replace(USERNAME_PLACEHOLDER, &self.username)
            .replace(PASSWORD_PLACEHOLDER, &self.password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("connection_string", &self.connection_string)
            .finish()
    }
}

/// Connection pool sizing and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Upper bound on open connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long to wait for a connection before failing
    pub connect_timeout: Duration,
    /// Idle connections older than this are closed
    pub idle_timeout: Option<Duration>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn placeholders_are_substituted() {
        let credentials = Credentials::new(
            "tickets",
            "s3cret",
            "postgres://{{username}}:{{password}}@db:5432/tickets",
        );
        assert_eq!(
            credentials.connection_url(),
            "postgres://tickets:s3cret@db:5432/tickets"
        );
    }

    #[test]
    fn connection_string_without_placeholders_is_used_verbatim() {
        let credentials = Credentials::new("u", "p", "postgres://localhost/tickets");
        assert_eq!(credentials.connection_url(), "postgres://localhost/tickets");
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let err = Credentials::from_json(r#"{"username": "u", "password": "p"}"#).unwrap_err();
        assert!(matches!(err, StoreError::Configuration(ref msg) if msg.contains("connection_string")));
    }

    #[test]
    fn empty_value_is_a_configuration_error() {
        let err = Credentials::from_json(
            r#"{"username": "u", "password": "", "connection_string": "postgres://x"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Configuration(ref msg) if msg.contains("password")));
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let err = Credentials::from_json("not json").unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = Credentials::from_file("/nonexistent/credentials.json").unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }

    #[test]
    fn reads_credentials_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"username": "u", "password": "p", "connection_string": "postgres://{{{{username}}}}@h/db"}}"#
        )
        .expect("write");

        let credentials = Credentials::from_file(file.path()).expect("valid file");
        assert_eq!(credentials.username(), "u");
        assert_eq!(credentials.connection_url(), "postgres://u@h/db");
    }

    #[test]
    fn debug_redacts_password() {
        let credentials = Credentials::new("u", "hunter2", "postgres://x");
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
