use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Derived classification of one attendance record. Never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, ToSchema, Display, EnumString)]
pub enum AttendanceStatus {
    OnTime,
    Late,
    EarlyLeave,
    LateAndEarlyLeave,
    Undetermined,
}

impl AttendanceStatus {
    pub fn is_late(self) -> bool {
        matches!(self, AttendanceStatus::Late | AttendanceStatus::LateAndEarlyLeave)
    }
}

/// Per-employee payroll totals for one aggregation query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "employeeId": 1001,
        "fullName": "John Doe",
        "totalWorkDays": 21,
        "lateDays": 2
    })
)]
pub struct EmployeeSalarySummary {
    pub employee_id: u64,
    pub full_name: String,
    pub total_work_days: u32,
    pub late_days: u32,
}

impl EmployeeSalarySummary {
    pub fn new(employee_id: u64, full_name: String) -> Self {
        Self {
            employee_id,
            full_name,
            total_work_days: 0,
            late_days: 0,
        }
    }
}
