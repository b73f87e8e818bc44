//! Passenger data as the vendor ticket form accepts it.

use tramo_core::booking::{Passenger, PassengerName};

/// Names this long (first + last, in characters) get the last name shortened.
pub const FULL_NAME_LIMIT: usize = 60;
pub const LAST_NAME_LIMIT: usize = 39;
/// Width of each name field on the vendor form.
pub const NAME_FIELD_LIMIT: usize = 20;

pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split into first/second name and first/second surname.
pub fn split_name(first_name: &str, last_name: &str) -> PassengerName {
    let first_name = normalize_whitespace(first_name);
    let mut last_name = normalize_whitespace(last_name);

    if first_name.chars().count() + last_name.chars().count() >= FULL_NAME_LIMIT {
        last_name = truncate(&last_name, LAST_NAME_LIMIT).trim_end().to_string();
    }

    let (first, second) = split_once_space(&first_name);
    let (last, second_last) = split_once_space(&last_name);

    PassengerName {
        first: truncate(first, NAME_FIELD_LIMIT),
        second: truncate(second, NAME_FIELD_LIMIT),
        last: truncate(last, NAME_FIELD_LIMIT),
        second_last: truncate(second_last, NAME_FIELD_LIMIT),
    }
}

/// Nationality, only when the marketplace actually sent one.
pub fn nationality(passenger: &Passenger) -> Option<String> {
    passenger
        .nationality
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn split_once_space(name: &str) -> (&str, &str) {
    name.split_once(' ').unwrap_or((name, ""))
}

fn truncate(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_two_part_names() {
        let name = split_name("Maria Fernanda", "Rodriguez Lopez");
        assert_eq!(name.first, "Maria");
        assert_eq!(name.second, "Fernanda");
        assert_eq!(name.last, "Rodriguez");
        assert_eq!(name.second_last, "Lopez");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let name = split_name("  Maria   Fernanda ", "Rodriguez\t\tLopez");
        assert_eq!((name.first.as_str(), name.second.as_str()), ("Maria", "Fernanda"));
        assert_eq!(name.second_last, "Lopez");

        let single = split_name("Cher", "");
        assert_eq!(single.first, "Cher");
        assert!(single.second.is_empty() && single.last.is_empty());
    }

    #[test]
    fn test_long_last_name_is_cut_before_splitting() {
        // 21 + 45 = 66 characters.
        let first = "Maria Fernanda Isabel";
        let last = "Rodriguez Lopez de la Fuente y Santa Cruz Mar";
        let name = split_name(first, last);

        // The 39-character cut keeps "Rodriguez Lopez de la Fuente y Santa Cr".
        assert_eq!(name.last, "Rodriguez");
        assert_eq!(name.second_last, "Lopez de la Fuente y");
        assert_eq!(name.second, "Fernanda Isabel");
    }

    #[test]
    fn test_cut_happens_only_at_the_limit() {
        let first = "A".repeat(20);
        let last = format!("Perez {}", "B".repeat(33));
        // 20 + 39 = 59: untouched.
        assert_eq!(split_name(&first, &last).second_last, "B".repeat(20));

        let last = format!("Perez {}", "B".repeat(40));
        // 20 + 46 = 66: cut to "Perez " + 33 B's, then the field limit applies.
        let name = split_name(&first, &last);
        assert_eq!(name.last, "Perez");
        assert_eq!(name.second_last, "B".repeat(20));
    }

    #[test]
    fn test_blank_nationality_is_dropped() {
        let mut passenger = Passenger {
            first_name: "Ana".to_string(),
            last_name: "Soto".to_string(),
            document_type: "RUT".to_string(),
            document_number: "1-9".to_string(),
            nationality: Some("  ".to_string()),
            seat: 1,
            offer: None,
        };
        assert_eq!(nationality(&passenger), None);

        passenger.nationality = Some("CL".to_string());
        assert_eq!(nationality(&passenger), Some("CL".to_string()));
    }
}
