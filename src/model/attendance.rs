use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::summary::AttendanceStatus;

/// Named work period with fixed wall-clock bounds, both "HH:MM".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRef {
    #[schema(example = "Morning")]
    pub shift_name: String,

    #[schema(example = "08:00")]
    pub start_time: String,

    #[schema(example = "17:00")]
    pub end_time: String,
}

/// One employee's attendance for one calendar date.
///
/// `employee_id` is a foreign reference and may be missing when the owning
/// employee row no longer joins. Check-in/check-out are kept as the raw
/// "HH:MM" strings the store hands back, malformed values included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001, nullable = true)]
    pub employee_id: Option<u64>,

    #[schema(example = "John Doe", nullable = true)]
    pub full_name: Option<String>,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "08:03", nullable = true)]
    pub check_in_time: Option<String>,

    #[schema(example = "17:10", nullable = true)]
    pub check_out_time: Option<String>,

    pub shift: Option<ShiftRef>,

    /// Precomputed at check-out time, consumed as-is.
    pub is_early_leave: bool,

    pub note: Option<String>,
}

/// Flat row shape of the attendance/employee/shift join.
#[derive(Debug, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: u64,
    pub employee_id: Option<u64>,
    pub full_name: Option<String>,
    pub date: NaiveDate,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub shift_name: Option<String>,
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    pub is_early_leave: bool,
    pub note: Option<String>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        // LEFT JOIN on shifts: a missing name means no shift was assigned
        let shift = row.shift_name.map(|shift_name| ShiftRef {
            shift_name,
            start_time: row.shift_start.unwrap_or_default(),
            end_time: row.shift_end.unwrap_or_default(),
        });

        Self {
            id: row.id,
            employee_id: row.employee_id,
            full_name: row.full_name,
            date: row.date,
            check_in_time: row.check_in_time,
            check_out_time: row.check_out_time,
            shift,
            is_early_leave: row.is_early_leave,
            note: row.note,
        }
    }
}

/// A record annotated with its derived status, as served to dashboards.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub status: AttendanceStatus,
    pub is_late: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(shift_name: Option<&str>, shift_start: Option<&str>) -> AttendanceRow {
        AttendanceRow {
            id: 3,
            employee_id: Some(10),
            full_name: Some("Jane Roe".to_string()),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            check_in_time: Some("08:01".to_string()),
            check_out_time: None,
            shift_name: shift_name.map(str::to_string),
            shift_start: shift_start.map(str::to_string),
            shift_end: Some("17:00".to_string()),
            is_early_leave: false,
            note: None,
        }
    }

    #[test]
    fn row_without_shift_name_has_no_shift() {
        let record = AttendanceRecord::from(row(None, Some("08:00")));
        assert!(record.shift.is_none());
    }

    #[test]
    fn row_with_shift_is_nested() {
        let record = AttendanceRecord::from(row(Some("Morning"), Some("08:00")));
        let shift = record.shift.expect("shift");
        assert_eq!(shift.shift_name, "Morning");
        assert_eq!(shift.start_time, "08:00");
        assert_eq!(shift.end_time, "17:00");
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = AttendanceRecord::from(row(Some("Morning"), Some("08:00")));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["checkInTime"], "08:01");
        assert_eq!(value["shift"]["startTime"], "08:00");
        assert_eq!(value["isEarlyLeave"], false);
    }
}
