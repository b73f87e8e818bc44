use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Vendor timestamp layout, e.g. `24/12/2025 07:30`.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

pub fn parse_timestamp(raw: &str) -> CoreResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| CoreError::Skippable(format!("bad timestamp '{}': {}", raw, e)))
}

#[derive(Debug, Deserialize)]
pub struct TripQuery {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
}

/// One vendor-operated segment of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub origin: String,
    pub destination: String,
    pub company: String,
    pub route_code: String,
    pub hour_code: String,
    pub additional_fare: bool,
    pub departure: String,
    pub arrival: String,
    pub fare: i64,
    pub available_seats: u32,
    pub occupied_seats: u32,
}

impl Leg {
    pub fn departure_at(&self) -> CoreResult<NaiveDateTime> {
        parse_timestamp(&self.departure)
    }

    pub fn arrival_at(&self) -> CoreResult<NaiveDateTime> {
        parse_timestamp(&self.arrival)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layover {
    /// Where the passenger changes bus.
    pub city: String,
    pub minutes: i64,
}

/// Ordered legs of a direct or connecting trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub legs: Vec<Leg>,
}

impl Trip {
    pub fn new(legs: Vec<Leg>) -> Self {
        Self { legs }
    }

    pub fn total_fare(&self) -> i64 {
        self.legs.iter().map(|leg| leg.fare).sum()
    }

    /// `company-route` per leg, joined with `::`.
    pub fn route_id(&self) -> String {
        self.legs
            .iter()
            .map(|leg| format!("{}-{}", leg.company, leg.route_code))
            .collect::<Vec<_>>()
            .join("::")
    }

    /// `route-hour-ddmmyyyyHHMM` per leg, joined with `::`.
    pub fn journey_id(&self) -> String {
        self.legs
            .iter()
            .map(|leg| {
                let stamp: String = leg.departure.chars().filter(|c| c.is_ascii_digit()).collect();
                format!("{}-{}-{}", leg.route_code, leg.hour_code, stamp)
            })
            .collect::<Vec<_>>()
            .join("::")
    }

    /// Waiting time between each pair of adjacent legs.
    pub fn layovers(&self) -> CoreResult<Vec<Layover>> {
        self.legs
            .windows(2)
            .map(|pair| {
                let arrival = pair[0].arrival_at()?;
                let departure = pair[1].departure_at()?;
                Ok(Layover {
                    city: pair[0].destination.clone(),
                    minutes: (departure - arrival).num_minutes(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub code: String,
    pub name: String,
}
