use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Add;

/// Seat number -> discount percent for one leg.
pub type DiscountMap = BTreeMap<u32, u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub column: u32,
    /// Row band: 4 and 3 on one side of the aisle, 1 and 0 on the other.
    pub row: u32,
    /// Deck, 0 for single-deck buses.
    pub depth: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Available,
    Booked,
}

impl Availability {
    pub fn is_available(self) -> bool {
        self == Availability::Available
    }

    pub fn and(self, other: Availability) -> Availability {
        if self.is_available() && other.is_available() {
            Availability::Available
        } else {
            Availability::Booked
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationType {
    NotReserved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub number: u32,
    pub position: Position,
    pub availability: Availability,
    /// Net fare after the seat discount.
    pub fare: i64,
    pub discount: i64,
    pub reservation_type: ReservationType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutCell {
    Seat(Seat),
    Aisle { position: Position },
}

impl LayoutCell {
    pub fn as_seat(&self) -> Option<&Seat> {
        match self {
            LayoutCell::Seat(seat) => Some(seat),
            LayoutCell::Aisle { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutFare {
    pub net: i64,
    pub tax: i64,
    pub discount: i64,
}

impl Add for LayoutFare {
    type Output = LayoutFare;

    fn add(self, other: LayoutFare) -> LayoutFare {
        LayoutFare {
            net: self.net + other.net,
            tax: self.tax + other.tax,
            discount: self.discount + other.discount,
        }
    }
}

/// Seat grid for one leg, or the combination of several legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatLayout {
    pub cells: Vec<LayoutCell>,
    pub available_seats: u32,
    pub fare: LayoutFare,
    /// One discount map per leg, in leg order. Round-tripped into booking calls.
    pub extra: Vec<DiscountMap>,
}

impl SeatLayout {
    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.cells.iter().filter_map(LayoutCell::as_seat)
    }

    pub fn seat(&self, number: u32) -> Option<&Seat> {
        self.seats().find(|seat| seat.number == number)
    }

    pub fn count_available(&self) -> u32 {
        self.seats().filter(|seat| seat.availability.is_available()).count() as u32
    }
}

/// Seat-map row as returned by the vendor, before decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatMapEntry {
    /// 0 for cells that are not seats.
    pub number: u32,
    /// Row-band prefix followed by the column, e.g. `IV12`.
    pub location: String,
    /// `L` when free.
    pub status: String,
    pub discount_percent: u32,
    pub floor: u32,
}
