//! Request payload validation.
//!
//! The only check performed is field presence: every operation passes the exact
//! set of field names it needs and [`validate`] rejects payloads that lack any
//! of them. Values must be JSON strings or numbers so they can be stored as
//! text; numbers keep their decimal rendering (`7` becomes `"7"`).

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Canonical wire and storage field names.
pub mod fields {
    /// Smart contract address that issued the ticket.
    pub const CONTRACT_ADDRESS: &str = "contractAddress";
    /// Event the ticket admits to.
    pub const EVENT_NAME: &str = "eventName";
    /// Current ticket holder.
    pub const USER_ADDRESS: &str = "userAddress";
    /// Ticket identifier within its contract.
    pub const TICKET_ID: &str = "ticketId";
    /// QR code presented at the door.
    pub const QR_CODE: &str = "qrCode";
}

/// Field sets required by each operation.
pub mod required {
    use super::fields::{CONTRACT_ADDRESS, EVENT_NAME, QR_CODE, TICKET_ID, USER_ADDRESS};

    /// `AddTicket` and `UpdateTicketOwner` bodies.
    pub const TICKET: &[&str] = &[CONTRACT_ADDRESS, EVENT_NAME, USER_ADDRESS, TICKET_ID];
    /// `RedeemTicket` body.
    pub const REDEMPTION: &[&str] = &[USER_ADDRESS, CONTRACT_ADDRESS, TICKET_ID, EVENT_NAME, QR_CODE];
    /// Ticket and redemption queries.
    pub const OWNER_QUERY: &[&str] = &[USER_ADDRESS];
    /// Event-code registration and lookup.
    pub const EVENT_CODE: &[&str] = &[EVENT_NAME, QR_CODE];
}

/// Reasons a payload is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The payload is not a JSON object.
    #[error("Request payload must be a JSON object")]
    NotAnObject,

    /// One or more required fields are absent or null.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A field holds something other than a string or a number.
    #[error("Field `{0}` must be a string or a number")]
    InvalidFieldType(String),
}

/// A payload that passed [`validate`].
///
/// Holds the text of every scalar field in the payload. Required fields are
/// guaranteed present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedPayload {
    values: BTreeMap<String, String>,
}

impl ValidatedPayload {
    /// Returns a field's text, if it was present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns a field that the validation step declared as required.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] if the field was not part of
    /// the payload, which only happens when it was not listed as required.
    pub fn required(&self, name: &str) -> Result<&str, ValidationError> {
        self.field(name)
            .ok_or_else(|| ValidationError::MissingFields(vec![name.to_string()]))
    }

    /// Number of scalar fields captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no scalar fields were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Checks that `payload` is an object holding every field in `required`.
///
/// Null counts as absent. Optional fields that are strings or numbers are kept;
/// optional fields of other types are dropped.
///
/// # Errors
///
/// - [`ValidationError::NotAnObject`] if `payload` is not an object
/// - [`ValidationError::MissingFields`] listing every absent required field
/// - [`ValidationError::InvalidFieldType`] if a required field is not a string or number
pub fn validate(payload: &Value, required: &[&str]) -> Result<ValidatedPayload, ValidationError> {
    let Value::Object(object) = payload else {
        return Err(ValidationError::NotAnObject);
    };

    let missing: Vec<String> = required
        .iter()
        .filter(|name| object.get(**name).is_none_or(Value::is_null))
        .map(|name| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let mut values = BTreeMap::new();
    for (name, value) in object {
        match scalar_text(value) {
            Some(text) => {
                values.insert(name.clone(), text);
            }
            None if required.contains(&name.as_str()) => {
                return Err(ValidationError::InvalidFieldType(name.clone()));
            }
            None => {}
        }
    }

    Ok(ValidatedPayload { values })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
