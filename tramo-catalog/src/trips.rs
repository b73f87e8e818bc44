use chrono::NaiveDateTime;
use tracing::{debug, warn};
use tramo_core::trip::{Leg, Trip};
use tramo_core::CoreResult;

/// Phrase the vendor puts in its error envelope when a route simply has no departures.
pub const NO_TRIPS_MARKER: &str = "no existen servicios";

pub fn is_no_trips_message(message: &str) -> bool {
    message.to_lowercase().contains(NO_TRIPS_MARKER)
}

/// Keep the trips that serve the requested route, with legs in departure order.
///
/// Trips that do not match, or whose departure cannot be parsed, are dropped.
pub fn filter_and_compose(
    raw_trips: Vec<Trip>,
    source_id: &str,
    dest_id: &str,
    company: &str,
    support_connections: bool,
) -> Vec<Trip> {
    raw_trips
        .into_iter()
        .filter_map(|trip| match sort_legs(trip) {
            Ok(trip) => Some(trip),
            Err(e) => {
                warn!("Dropping trip: {}", e);
                None
            }
        })
        .filter(|trip| {
            let keep = if trip.legs.len() == 1 {
                is_valid_direct(&trip.legs[0], source_id, dest_id, company)
            } else {
                support_connections && is_valid_connection(&trip.legs, source_id, dest_id, company)
            };
            if !keep {
                debug!("Trip {} does not serve {} -> {}", trip.route_id(), source_id, dest_id);
            }
            keep
        })
        .collect()
}

fn is_valid_direct(leg: &Leg, source_id: &str, dest_id: &str, company: &str) -> bool {
    leg.origin == source_id && leg.company == company && leg.destination == dest_id
}

fn is_valid_connection(legs: &[Leg], source_id: &str, dest_id: &str, company: &str) -> bool {
    match legs {
        [first, second] => {
            first.origin == source_id
                && first.company == company
                && second.company == company
                && second.destination == dest_id
        }
        _ => false,
    }
}

fn sort_legs(trip: Trip) -> CoreResult<Trip> {
    let mut keyed = trip
        .legs
        .into_iter()
        .map(|leg| Ok((leg.departure_at()?, leg)))
        .collect::<CoreResult<Vec<(NaiveDateTime, Leg)>>>()?;

    keyed.sort_by(|(a_at, a), (b_at, b)| a_at.cmp(b_at).then_with(|| a.departure.cmp(&b.departure)));

    Ok(Trip::new(keyed.into_iter().map(|(_, leg)| leg).collect()))
}


#[cfg(test)]
mod tests {
    use super::fixtures::leg;
    use super::*;

    #[test]
    fn test_direct_trip_must_match_exactly() {
        let raw = vec![
            Trip::new(vec![leg("STG", "TAL", "TUR", "24/12/2025 07:30")]),
            Trip::new(vec![leg("STG", "TAL", "OTHER", "24/12/2025 08:30")]),
            Trip::new(vec![leg("STG", "CHI", "TUR", "24/12/2025 09:30")]),
        ];

        let trips = filter_and_compose(raw, "STG", "TAL", "TUR", true);
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].legs[0].departure, "24/12/2025 07:30");
    }

    #[test]
    fn test_connecting_legs_are_sorted_by_departure() {
        // Vendor sends the second leg first. As strings, 10/01/2026 would sort before 31/12/2025.
        let raw = vec![Trip::new(vec![
            leg("TAL", "CHI", "TUR", "10/01/2026 01:00"),
            leg("STG", "TAL", "TUR", "31/12/2025 22:00"),
        ])];

        let trips = filter_and_compose(raw, "STG", "CHI", "TUR", true);
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].legs[0].origin, "STG");
        assert_eq!(trips[0].legs[1].origin, "TAL");
    }

    #[test]
    fn test_connections_need_support_and_company_chain() {
        let connection = || {
            Trip::new(vec![
                leg("STG", "TAL", "TUR", "24/12/2025 07:30"),
                leg("TAL", "CHI", "TUR", "24/12/2025 11:00"),
            ])
        };
        let foreign_second_leg = Trip::new(vec![
            leg("STG", "TAL", "TUR", "24/12/2025 07:30"),
            leg("TAL", "CHI", "OTHER", "24/12/2025 11:00"),
        ]);
        let wrong_destination = Trip::new(vec![
            leg("STG", "TAL", "TUR", "24/12/2025 07:30"),
            leg("TAL", "CON", "TUR", "24/12/2025 11:00"),
        ]);

        assert!(filter_and_compose(vec![connection()], "STG", "CHI", "TUR", false).is_empty());
        assert_eq!(
            filter_and_compose(
                vec![connection(), foreign_second_leg, wrong_destination],
                "STG",
                "CHI",
                "TUR",
                true
            )
            .len(),
            1
        );
    }

    #[test]
    fn test_unparseable_trip_is_skipped_not_fatal() {
        let raw = vec![
            Trip::new(vec![leg("STG", "TAL", "TUR", "2025-12-24 07:30")]),
            Trip::new(vec![leg("STG", "TAL", "TUR", "24/12/2025 07:30")]),
        ];

        assert_eq!(filter_and_compose(raw, "STG", "TAL", "TUR", true).len(), 1);
    }

    #[test]
    fn test_no_trips_marker() {
        assert!(is_no_trips_message("ERROR: No existen servicios para la fecha"));
        assert!(!is_no_trips_message("token expired"));
    }
}
