//! Ticket domain types.
//!
//! Field names serialize in camelCase, which is both the wire format and the
//! stored document shape.

use crate::validation::{ValidatedPayload, ValidationError, fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a ticket across its whole lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketKey {
    /// Issuing contract
    pub contract_address: String,
    /// Ticket identifier within the contract
    pub ticket_id: String,
}

impl TicketKey {
    /// Creates a key.
    #[must_use]
    pub fn new(contract_address: impl Into<String>, ticket_id: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into(),
            ticket_id: ticket_id.into(),
        }
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.contract_address, self.ticket_id)
    }
}

/// An unused ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Issuing contract
    pub contract_address: String,
    /// Event the ticket admits to
    pub event_name: String,
    /// Current holder
    pub user_address: String,
    /// Ticket identifier within the contract
    pub ticket_id: String,
}

impl Ticket {
    /// Creates a ticket.
    #[must_use]
    pub fn new(
        contract_address: impl Into<String>,
        event_name: impl Into<String>,
        user_address: impl Into<String>,
        ticket_id: impl Into<String>,
    ) -> Self {
        Self {
            contract_address: contract_address.into(),
            event_name: event_name.into(),
            user_address: user_address.into(),
            ticket_id: ticket_id.into(),
        }
    }

    /// Builds a ticket from a payload validated against
    /// [`crate::validation::required::TICKET`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] if the payload lacks a ticket field.
    pub fn from_payload(payload: &ValidatedPayload) -> Result<Self, ValidationError> {
        Ok(Self::new(
            payload.required(fields::CONTRACT_ADDRESS)?,
            payload.required(fields::EVENT_NAME)?,
            payload.required(fields::USER_ADDRESS)?,
            payload.required(fields::TICKET_ID)?,
        ))
    }

    /// The ticket's lifecycle identity.
    #[must_use]
    pub fn key(&self) -> TicketKey {
        TicketKey::new(&self.contract_address, &self.ticket_id)
    }
}

/// A request to redeem a ticket at the door.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redemption {
    /// Holder presenting the ticket
    pub user_address: String,
    /// Ticket being redeemed
    pub key: TicketKey,
    /// Event being entered
    pub event_name: String,
    /// Raw QR code as presented
    pub qr_code: String,
}

impl Redemption {
    /// Builds a redemption from a payload validated against
    /// [`crate::validation::required::REDEMPTION`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] if the payload lacks a redemption field.
    pub fn from_payload(payload: &ValidatedPayload) -> Result<Self, ValidationError> {
        Ok(Self {
            user_address: payload.required(fields::USER_ADDRESS)?.to_string(),
            key: TicketKey::new(
                payload.required(fields::CONTRACT_ADDRESS)?,
                payload.required(fields::TICKET_ID)?,
            ),
            event_name: payload.required(fields::EVENT_NAME)?.to_string(),
            qr_code: payload.required(fields::QR_CODE)?.to_string(),
        })
    }
}

/// Append-only record written when a ticket is redeemed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedTicketRecord {
    /// Holder that redeemed the ticket
    pub user_address: String,
    /// Event entered
    pub event_name: String,
    /// Encoded QR code
    pub qr_code: String,
    /// Issuing contract of the redeemed ticket
    pub contract_address: String,
    /// Identifier of the redeemed ticket
    pub ticket_id: String,
    /// When the redemption happened
    pub redeemed_at: DateTime<Utc>,
}

/// Public projection of a [`UsedTicketRecord`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionView {
    /// Event entered
    pub event_name: String,
    /// Encoded QR code
    pub qr_code: String,
    /// Holder that redeemed the ticket
    pub user_address: String,
}

/// Event-level QR code registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Event name
    pub event_name: String,
    /// Encoded QR code
    pub qr_code: String,
}
