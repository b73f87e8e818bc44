//! Per-leg seat grids, either synthesized from seat counts or decoded from the vendor map.

use tramo_core::fare::apply_discount;
use tramo_core::seat::{
    Availability, DiscountMap, LayoutCell, LayoutFare, Position, ReservationType, Seat,
    SeatLayout, SeatMapEntry,
};
use tramo_core::{CoreError, CoreResult};

pub const SEATS_PER_COLUMN: u32 = 4;

/// Row of each seat inside a template column, in seat-number order.
const TEMPLATE_ROWS: [u32; SEATS_PER_COLUMN as usize] = [4, 3, 0, 1];

const AISLE_ROW: u32 = 2;

/// Largest seat count a template grid is built for.
pub const MAX_TEMPLATE_SEATS: u32 = 120;

/// Vendor row-band prefixes: window/aisle on either side of the bus.
const ROW_BANDS: [(&str, u32); 4] = [("IV", 4), ("IP", 3), ("DP", 1), ("DV", 0)];

const AVAILABLE_STATUS: &str = "L";

/// Grid built from seat counts alone, used for listings where no seat map was fetched.
///
/// The first `available` seat numbers are free, the remainder booked. Seat counts above
/// [`MAX_TEMPLATE_SEATS`] make the trip unlistable.
pub fn template(available: u32, occupied: u32, fare: i64) -> CoreResult<SeatLayout> {
    let total = available
        .checked_add(occupied)
        .filter(|total| *total <= MAX_TEMPLATE_SEATS)
        .ok_or_else(|| {
            CoreError::Skippable(format!(
                "implausible seat count: {} available, {} occupied",
                available, occupied
            ))
        })?;
    let columns = total.div_ceil(SEATS_PER_COLUMN);
    let mut cells = Vec::new();
    let mut discounts = DiscountMap::new();

    for column in 1..=columns {
        for (index, row) in TEMPLATE_ROWS.iter().enumerate() {
            let number = (column - 1) * SEATS_PER_COLUMN + index as u32 + 1;
            if number > total {
                break;
            }
            if index == 2 {
                cells.push(LayoutCell::Aisle {
                    position: Position { column, row: AISLE_ROW, depth: 0 },
                });
            }
            let availability = if number <= available {
                Availability::Available
            } else {
                Availability::Booked
            };
            cells.push(LayoutCell::Seat(Seat {
                number,
                position: Position { column, row: *row, depth: 0 },
                availability,
                fare,
                discount: 0,
                reservation_type: ReservationType::NotReserved,
            }));
            discounts.insert(number, 0);
        }
    }

    Ok(finish(cells, fare, discounts))
}

/// Grid decoded from the vendor's seat map, with per-seat discounts applied to `fare`.
pub fn from_vendor(entries: &[SeatMapEntry], fare: i64) -> CoreResult<SeatLayout> {
    let mut cells = Vec::with_capacity(entries.len());
    let mut discounts = DiscountMap::new();

    for entry in entries {
        if entry.number == 0 {
            let code = entry.location.trim();
            cells.push(LayoutCell::Aisle {
                position: Position {
                    column: code.get(2..).and_then(|c| c.parse().ok()).unwrap_or(0),
                    row: code.get(..2).and_then(row_band).unwrap_or(AISLE_ROW),
                    depth: entry.floor,
                },
            });
            continue;
        }

        let (column, row) = decode_location(&entry.location)?;
        let net = apply_discount(fare, entry.discount_percent);
        let availability = if entry.status.trim() == AVAILABLE_STATUS {
            Availability::Available
        } else {
            Availability::Booked
        };

        cells.push(LayoutCell::Seat(Seat {
            number: entry.number,
            position: Position { column, row, depth: entry.floor },
            availability,
            fare: net,
            discount: fare - net,
            reservation_type: ReservationType::NotReserved,
        }));
        discounts.insert(entry.number, entry.discount_percent);
    }

    Ok(finish(cells, fare, discounts))
}

/// Split a location code such as `DV07` into (column, row).
pub fn decode_location(code: &str) -> CoreResult<(u32, u32)> {
    let code = code.trim();
    let invalid = || CoreError::ValidationError(format!("invalid seat location '{}'", code));

    let row = code.get(..2).and_then(row_band).ok_or_else(invalid)?;
    let column = code
        .get(2..)
        .and_then(|digits| digits.parse::<u32>().ok())
        .ok_or_else(invalid)?;

    Ok((column, row))
}

fn row_band(prefix: &str) -> Option<u32> {
    ROW_BANDS
        .iter()
        .find(|(band, _)| band.eq_ignore_ascii_case(prefix))
        .map(|(_, row)| *row)
}

fn finish(cells: Vec<LayoutCell>, base_fare: i64, discounts: DiscountMap) -> SeatLayout {
    let mut layout = SeatLayout {
        cells,
        available_seats: 0,
        fare: LayoutFare::default(),
        extra: vec![discounts],
    };
    layout.available_seats = layout.count_available();

    let net = layout
        .seats()
        .filter(|seat| seat.availability.is_available())
        .map(|seat| seat.fare)
        .min()
        .unwrap_or(base_fare);
    layout.fare = LayoutFare {
        net,
        tax: 0,
        discount: base_fare - net,
    };
    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(number: u32, location: &str, status: &str, discount_percent: u32) -> SeatMapEntry {
        SeatMapEntry {
            number,
            location: location.to_string(),
            status: status.to_string(),
            discount_percent,
            floor: 0,
        }
    }

    #[test]
    fn test_template_marks_first_seats_available() {
        let layout = template(5, 2, 9_000).unwrap();

        let seats: Vec<&Seat> = layout.seats().collect();
        assert_eq!(seats.len(), 7);
        assert_eq!(layout.available_seats, 5);
        assert!(seats[..5].iter().all(|s| s.availability == Availability::Available));
        assert!(seats[5..].iter().all(|s| s.availability == Availability::Booked));
        assert!(seats.iter().all(|s| s.fare == 9_000));
        assert_eq!(layout.fare, LayoutFare { net: 9_000, tax: 0, discount: 0 });
    }

    #[test]
    fn test_template_positions() {
        let layout = template(8, 0, 1_000).unwrap();

        let rows: Vec<u32> = layout.seats().map(|s| s.position.row).collect();
        assert_eq!(rows, vec![4, 3, 0, 1, 4, 3, 0, 1]);
        assert_eq!(layout.seat(5).unwrap().position.column, 2);

        let aisles = layout
            .cells
            .iter()
            .filter(|c| matches!(c, LayoutCell::Aisle { .. }))
            .count();
        assert_eq!(aisles, 2);
    }

    #[test]
    fn test_template_truncates_to_total_seats() {
        // 30 seats is built like any other size.
        let layout = template(28, 2, 1_000).unwrap();
        assert_eq!(layout.seats().count(), 30);
        assert_eq!(layout.seats().last().unwrap().number, 30);
        assert_eq!(layout.extra[0].len(), 30);
    }

    #[test]
    fn test_template_rejects_implausible_counts() {
        assert!(template(MAX_TEMPLATE_SEATS, 0, 1_000).is_ok());
        assert!(matches!(template(MAX_TEMPLATE_SEATS, 1, 1_000), Err(CoreError::Skippable(_))));
        assert!(matches!(template(u32::MAX, 1, 1_000), Err(CoreError::Skippable(_))));
    }

    #[test]
    fn test_decode_location() {
        assert_eq!(decode_location("IV12").unwrap(), (12, 4));
        assert_eq!(decode_location("ip3").unwrap(), (3, 3));
        assert_eq!(decode_location("DP01").unwrap(), (1, 1));
        assert_eq!(decode_location("DV7").unwrap(), (7, 0));
        assert!(decode_location("XX1").is_err());
        assert!(decode_location("IV").is_err());
    }

    #[test]
    fn test_vendor_seats_apply_discount() {
        let entries = vec![
            entry(1, "IV1", "L", 0),
            entry(2, "IP1", "O", 0),
            entry(0, "PA1", "", 0),
            entry(3, "DP1", "L", 15),
            entry(4, "DV1", "L", 10),
        ];

        let layout = from_vendor(&entries, 2_345).unwrap();

        assert_eq!(layout.available_seats, 3);
        assert_eq!(layout.seat(2).unwrap().availability, Availability::Booked);
        let discounted = layout.seat(4).unwrap();
        assert_eq!(discounted.fare, 2_111);
        assert_eq!(discounted.discount, 234);
        assert_eq!(layout.extra[0].get(&3), Some(&15));
        assert_eq!(layout.cells.len(), 5);
        // Cheapest free seat is seat 3: 2_345 * 0.85 = 1_993.25
        assert_eq!(layout.fare, LayoutFare { net: 1_993, tax: 0, discount: 352 });
    }

    #[test]
    fn test_bad_vendor_location_fails() {
        let entries = vec![entry(1, "ZZ1", "L", 0)];
        assert!(matches!(from_vendor(&entries, 100), Err(CoreError::ValidationError(_))));
    }
}
