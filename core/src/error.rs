//! Ticket lifecycle errors.

use crate::store::StoreError;
use crate::ticket::TicketKey;
use crate::validation::ValidationError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, TicketError>;

/// Everything a lifecycle operation can fail with.
///
/// Validation, not-found and conflict errors are the caller's to fix. Timeout
/// and store errors are infrastructure failures and are never retried here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// The request payload is incomplete or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No unused ticket matches the given key.
    #[error("Ticket {0} not found")]
    NotFound(TicketKey),

    /// A ticket with the same key was already issued.
    #[error("Ticket {0} already exists")]
    Conflict(TicketKey),

    /// The ticket was redeemed before (possibly by a concurrent request).
    #[error("Ticket {0} has already been redeemed")]
    AlreadyRedeemed(TicketKey),

    /// A store operation exceeded its time budget.
    #[error("Store operation `{operation}` timed out after {}ms", .timeout.as_millis())]
    Timeout {
        /// Operation that timed out
        operation: &'static str,
        /// Budget that was exceeded
        timeout: Duration,
    },

    /// The document store failed.
    #[error("Document store unavailable: {0}")]
    Store(#[from] StoreError),
}

impl TicketError {
    /// Whether the error stems from conflicting writes on the same ticket.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::AlreadyRedeemed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let key = TicketKey::new("0xA", "T1");
        assert_eq!(
            TicketError::NotFound(key.clone()).to_string(),
            "Ticket 0xA#T1 not found"
        );
        assert_eq!(
            TicketError::AlreadyRedeemed(key).to_string(),
            "Ticket 0xA#T1 has already been redeemed"
        );
        assert_eq!(
            TicketError::Timeout {
                operation: "find",
                timeout: Duration::from_millis(250)
            }
            .to_string(),
            "Store operation `find` timed out after 250ms"
        );
    }

    #[test]
    fn validation_is_transparent() {
        let err = TicketError::from(ValidationError::NotAnObject);
        assert_eq!(err.to_string(), "Request payload must be a JSON object");
    }

    #[test]
    fn conflict_kinds() {
        let key = TicketKey::new("0xA", "T1");
        assert!(TicketError::Conflict(key.clone()).is_conflict());
        assert!(TicketError::AlreadyRedeemed(key.clone()).is_conflict());
        assert!(!TicketError::NotFound(key).is_conflict());
    }
}
