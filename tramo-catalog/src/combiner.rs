use std::collections::HashMap;
use tracing::debug;
use tramo_core::seat::{Availability, LayoutCell, Seat, SeatLayout};
use tramo_core::{CoreError, CoreResult};

/// Merge per-leg layouts into the single layout sold for the whole trip.
///
/// The first leg defines the grid. A seat is free only if it is free on every leg, and
/// costs the sum of its per-leg fares. A seat number missing from a later leg counts as
/// booked on that leg.
pub fn combine(layouts: Vec<SeatLayout>) -> CoreResult<SeatLayout> {
    let mut legs = layouts.into_iter();
    let reference = legs
        .next()
        .ok_or_else(|| CoreError::ValidationError("no seat layouts to combine".to_string()))?;
    let others: Vec<SeatLayout> = legs.collect();
    if others.is_empty() {
        return Ok(reference);
    }

    let seats_by_leg: Vec<HashMap<u32, &Seat>> = others
        .iter()
        .map(|layout| layout.seats().map(|seat| (seat.number, seat)).collect())
        .collect();

    let fare = others.iter().fold(reference.fare, |total, layout| total + layout.fare);

    let mut extra = reference.extra;
    extra.extend(others.iter().flat_map(|layout| layout.extra.iter().cloned()));

    let cells = reference
        .cells
        .into_iter()
        .map(|cell| match cell {
            LayoutCell::Seat(mut seat) => {
                for seats in &seats_by_leg {
                    match seats.get(&seat.number) {
                        Some(other) => {
                            seat.availability = seat.availability.and(other.availability);
                            seat.fare += other.fare;
                            seat.discount += other.discount;
                        }
                        None => {
                            debug!("Seat {} missing on a later leg, marking booked", seat.number);
                            seat.availability = Availability::Booked;
                        }
                    }
                }
                LayoutCell::Seat(seat)
            }
            aisle => aisle,
        })
        .collect();

    let mut combined = SeatLayout {
        cells,
        available_seats: 0,
        fare,
        extra,
    };
    combined.available_seats = combined.count_available();
    Ok(combined)
}
