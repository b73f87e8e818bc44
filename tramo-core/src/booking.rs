use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::params::LegRequest;
use crate::secret::Secret;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document_number: String,
    #[serde(default)]
    pub nationality: Option<String>,
    pub seat: u32,
    /// Loyalty or promotional offer attached by the marketplace.
    #[serde(default)]
    pub offer: Option<OfferPayload>,
}

impl Passenger {
    pub fn discount(&self) -> i64 {
        self.offer.as_ref().map(|offer| offer.discount_amount).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferPayload {
    #[serde(default)]
    pub code: Option<String>,
    pub discount_amount: i64,
}

/// Held seats awaiting extension or confirmation. Lives for the block duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TentativeRecord {
    pub token: Secret<String>,
    pub seats: Vec<u32>,
    pub passengers: Vec<Passenger>,
    pub whitelabel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTicket {
    pub seat: u32,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegTransactions {
    pub reference_id: String,
    pub tickets: Vec<PendingTicket>,
}

/// Vendor ticket transactions created by an extension. Lives for the extended duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedRecord {
    pub whitelabel: Option<String>,
    pub legs: Vec<LegTransactions>,
}

impl ExtendedRecord {
    pub fn reference_ids(&self) -> Vec<&str> {
        self.legs.iter().map(|leg| leg.reference_id.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatMark {
    pub leg: LegRequest,
    pub seat: u32,
}

/// Passenger name split the way the vendor ticket form expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerName {
    pub first: String,
    pub second: String,
    pub last: String,
    pub second_last: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequest {
    pub reference_id: String,
    pub leg: LegRequest,
    pub seat: u32,
    pub name: PassengerName,
    pub document_type: String,
    pub document_number: String,
    pub nationality: Option<String>,
    /// Seat fare on this leg after the seat discount.
    pub fare: i64,
    /// This leg's share of the passenger's offer discount.
    pub discount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineConfirmation {
    pub reference_id: String,
    pub transaction_id: String,
}

/// Result of a single ticket creation or confirmation. `error` wins over the other fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketOutcome {
    pub ticket_number: Option<String>,
    pub transaction_id: Option<String>,
    pub error: Option<String>,
}

impl TicketOutcome {
    pub fn issued(ticket_number: &str, transaction_id: &str) -> Self {
        Self {
            ticket_number: Some(ticket_number.to_string()),
            transaction_id: Some(transaction_id.to_string()),
            error: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedSeat {
    pub leg: usize,
    pub seat: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialBlock {
    /// Seats held before the failure. They stay held until unblocked or expired.
    pub blocked: Vec<BlockedSeat>,
    pub failed: BlockedSeat,
    pub message: String,
}

impl fmt::Display for PartialBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seat {} on leg {} failed ({}), {} seat(s) already blocked",
            self.failed.seat,
            self.failed.leg,
            self.message,
            self.blocked.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialConfirm {
    /// Seat -> confirmation code.
    pub confirmed: BTreeMap<u32, String>,
    /// Seat -> error messages.
    pub unconfirmed: BTreeMap<u32, String>,
}

impl fmt::Display for PartialConfirm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} confirmed, {} unconfirmed: {:?}",
            self.confirmed.len(),
            self.unconfirmed.len(),
            self.unconfirmed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialUnblock {
    pub released: Vec<u32>,
    /// Seat -> error messages for seats that are still held.
    pub blocked: BTreeMap<u32, String>,
}

impl fmt::Display for PartialUnblock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} released, {} still blocked: {:?}",
            self.released.len(),
            self.blocked.len(),
            self.blocked
        )
    }
}
