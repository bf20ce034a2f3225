use crate::model::attendance::AttendanceRecord;
use crate::model::summary::AttendanceStatus;
use crate::timekeeping::time_utils::time_to_minutes;

/// Minutes after shift start still counted as on time.
pub const DEFAULT_LATE_THRESHOLD_MINUTES: i32 = 5;

/// Whether the record's check-in is past shift start plus the threshold.
///
/// `None` when check-in or shift start is missing or unparseable, or when the
/// deadline overflows. Arriving at exactly `start + threshold` is on time.
pub fn is_late(record: &AttendanceRecord, late_threshold_minutes: i32) -> Option<bool> {
    let check_in = record.check_in_time.as_deref()?;
    let shift_start = record.shift.as_ref().map(|s| s.start_time.as_str())?;

    let check_in = time_to_minutes(check_in).ok()?;
    let shift_start = time_to_minutes(shift_start).ok()?;

    let deadline = shift_start.checked_add(late_threshold_minutes)?;
    Some(check_in > deadline)
}

/// Classifies one record. Pure, malformed input yields `Undetermined`.
pub fn classify(record: &AttendanceRecord, late_threshold_minutes: i32) -> AttendanceStatus {
    let Some(late) = is_late(record, late_threshold_minutes) else {
        return AttendanceStatus::Undetermined;
    };

    match (late, record.is_early_leave) {
        (true, true) => AttendanceStatus::LateAndEarlyLeave,
        (true, false) => AttendanceStatus::Late,
        (false, true) => AttendanceStatus::EarlyLeave,
        (false, false) => AttendanceStatus::OnTime,
    }
}
