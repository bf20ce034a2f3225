use crate::error::TimekeepingError;

/// Parses a wall-clock "HH:MM" string into minutes since midnight.
///
/// The value must split on `:` into exactly two all-digit parts. Ranges are
/// not checked, "25:99" parses to 1599.
pub fn time_to_minutes(time: &str) -> Result<i32, TimekeepingError> {
    let malformed = || TimekeepingError::MalformedTime {
        value: time.to_string(),
    };

    let mut parts = time.trim().split(':');
    let (Some(hours), Some(minutes), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    let hours = numeric_part(hours).ok_or_else(malformed)?;
    let minutes = numeric_part(minutes).ok_or_else(malformed)?;

    hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .ok_or_else(malformed)
}

/// Signed `a - b` in minutes. Same-day only, no wraparound past midnight.
pub fn minutes_difference(a: i32, b: i32) -> i32 {
    a - b
}

/// True when `check_out` falls before `shift_end` by more than `tolerance_minutes`.
pub fn is_early_leave(
    check_out: &str,
    shift_end: &str,
    tolerance_minutes: i32,
) -> Result<bool, TimekeepingError> {
    let check_out = time_to_minutes(check_out)?;
    let shift_end = time_to_minutes(shift_end)?;

    Ok(minutes_difference(shift_end, check_out) > tolerance_minutes)
}

fn numeric_part(part: &str) -> Option<i32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
