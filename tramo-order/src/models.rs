use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tramo_core::booking::Passenger;
use tramo_core::params::LegParams;
use tramo_core::seat::DiscountMap;

#[derive(Debug, Clone, Deserialize)]
pub struct BlockRequest {
    #[serde(flatten)]
    pub params: LegParams,
    pub seats: Vec<u32>,
    pub passengers: Vec<Passenger>,
    #[serde(default)]
    pub whitelabel: Option<String>,
}

/// Legs of a booking as echoed back by the marketplace.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingLegs {
    #[serde(flatten)]
    pub params: LegParams,
    /// Per-leg seat discount maps from the layout the seats were picked on.
    #[serde(default)]
    pub extra: Vec<DiscountMap>,
}

impl BookingLegs {
    /// Seat discount percentage on one leg; seats the layout did not list have none.
    pub fn seat_discount(&self, leg: usize, seat: u32) -> u32 {
        self.extra
            .get(leg)
            .and_then(|discounts| discounts.get(&seat))
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReceipt {
    pub transaction_id: String,
    pub seats: Vec<u32>,
    pub expires_in_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendReceipt {
    pub transaction_id: String,
    pub reference_ids: Vec<String>,
    pub expires_in_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub transaction_id: String,
    /// Seat -> ticket numbers across legs.
    pub seats: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub transaction_id: String,
    pub released: Vec<u32>,
}
