use tramo_core::fare::round_half_up;

/// Split a passenger's discount across legs in proportion to each leg's fare.
///
/// Every share but the last is rounded half up; the last leg takes whatever is left so
/// the shares always add up to `total`.
pub fn split_discount(total: i64, leg_fares: &[i64]) -> Vec<i64> {
    let Some(last) = leg_fares.len().checked_sub(1) else {
        return Vec::new();
    };
    let total_fare: i64 = leg_fares.iter().sum();

    let mut shares: Vec<i64> = leg_fares[..last]
        .iter()
        .map(|fare| {
            if total_fare == 0 {
                0
            } else {
                round_half_up(total * fare, total_fare)
            }
        })
        .collect();
    let assigned: i64 = shares.iter().sum();
    shares.push(total - assigned);
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_split() {
        assert_eq!(split_discount(100, &[70, 30]), vec![70, 30]);
    }

    #[test]
    fn test_last_leg_absorbs_rounding() {
        assert_eq!(split_discount(101, &[70, 30]), vec![71, 30]);
        assert_eq!(split_discount(100, &[1, 1, 1]), vec![33, 33, 34]);
    }

    #[test]
    fn test_shares_always_sum_to_total() {
        for total in [0, 1, 7, 99, 1_001, 12_345] {
            for fares in [vec![10_000], vec![3, 7], vec![12_990, 4_510, 7_000], vec![0, 0]] {
                let shares = split_discount(total, &fares);
                assert_eq!(shares.len(), fares.len());
                assert_eq!(shares.iter().sum::<i64>(), total);
            }
        }
    }

    #[test]
    fn test_free_trip_puts_discount_on_last_leg() {
        assert_eq!(split_discount(50, &[0, 0]), vec![0, 50]);
        assert!(split_discount(50, &[]).is_empty());
    }
}
