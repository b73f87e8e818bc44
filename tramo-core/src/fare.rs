//! Integer currency arithmetic. All fares are whole currency units.

/// `numerator / denominator` rounded half away from zero.
pub fn round_half_up(numerator: i64, denominator: i64) -> i64 {
    if denominator == 0 {
        return 0;
    }
    let (numerator, denominator) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };
    if numerator >= 0 {
        (2 * numerator + denominator) / (2 * denominator)
    } else {
        -((-2 * numerator + denominator) / (2 * denominator))
    }
}

/// Fare after taking `percent` off, rounded half up. Percentages above 100 clamp to free.
pub fn apply_discount(fare: i64, percent: u32) -> i64 {
    let kept = 100 - i64::from(percent.min(100));
    round_half_up(fare * kept, 100)
}
