//! Per-seat reduction of vendor results across legs.

use std::collections::BTreeMap;
use tramo_core::booking::{PartialConfirm, PartialUnblock, TicketOutcome};
use tramo_core::CoreError;

const CODE_SEPARATOR: &str = "::";
const ERROR_SEPARATOR: &str = "; ";

#[derive(Debug, Default)]
struct SeatResults {
    codes: Vec<String>,
    errors: Vec<String>,
}

/// Collects one result per seat and leg. A seat succeeds only if every leg did.
#[derive(Debug, Default)]
pub struct SeatOutcomes {
    seats: BTreeMap<u32, SeatResults>,
}

impl SeatOutcomes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, seat: u32, result: Result<String, String>) {
        let entry = self.seats.entry(seat).or_default();
        match result {
            Ok(code) => entry.codes.push(code),
            Err(message) => entry.errors.push(message),
        }
    }

    /// Record a ticket call, successful only with an issued ticket number.
    pub fn record_ticket(&mut self, seat: u32, outcome: Result<TicketOutcome, CoreError>) {
        let result = match outcome {
            Ok(ticket) => match (ticket.error_message(), ticket.ticket_number.clone()) {
                (Some(message), _) => Err(message.to_string()),
                (None, Some(number)) => Ok(number),
                (None, None) => Err(format!("no ticket number returned for seat {}", seat)),
            },
            Err(e) => Err(failure_message(&e)),
        };
        self.record(seat, result);
    }

    /// Ticket codes per seat, or every confirmed and unconfirmed seat when any failed.
    pub fn into_confirmation(self) -> Result<BTreeMap<u32, String>, PartialConfirm> {
        let mut confirmed = BTreeMap::new();
        let mut unconfirmed = BTreeMap::new();
        for (seat, results) in self.seats {
            if results.errors.is_empty() {
                confirmed.insert(seat, results.codes.join(CODE_SEPARATOR));
            } else {
                unconfirmed.insert(seat, results.errors.join(ERROR_SEPARATOR));
            }
        }

        if unconfirmed.is_empty() {
            Ok(confirmed)
        } else {
            Err(PartialConfirm {
                confirmed,
                unconfirmed,
            })
        }
    }

    pub fn into_release(self) -> Result<Vec<u32>, PartialUnblock> {
        let mut released = Vec::new();
        let mut blocked = BTreeMap::new();
        for (seat, results) in self.seats {
            if results.errors.is_empty() {
                released.push(seat);
            } else {
                blocked.insert(seat, results.errors.join(ERROR_SEPARATOR));
            }
        }

        if blocked.is_empty() {
            Ok(released)
        } else {
            Err(PartialUnblock { released, blocked })
        }
    }
}

/// Message reported for a failed seat; vendor messages pass through untouched.
pub fn failure_message(err: &CoreError) -> String {
    match err {
        CoreError::VendorRequest(message) => message.clone(),
        other => other.to_string(),
    }
}
