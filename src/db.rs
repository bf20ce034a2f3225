use sqlx::MySqlPool;

use crate::model::attendance::{AttendanceRecord, AttendanceRow};
use crate::timekeeping::period::ReportPeriod;

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPool::connect(database_url).await
}

const RECORD_SELECT: &str = r#"
    SELECT a.id,
           e.id AS employee_id,
           CONCAT(e.first_name, ' ', e.last_name) AS full_name,
           a.date,
           TIME_FORMAT(a.check_in, '%H:%i') AS check_in_time,
           TIME_FORMAT(a.check_out, '%H:%i') AS check_out_time,
           s.shift_name,
           TIME_FORMAT(s.start_time, '%H:%i') AS shift_start,
           TIME_FORMAT(s.end_time, '%H:%i') AS shift_end,
           a.is_early_leave,
           a.note
    FROM attendance a
    LEFT JOIN employees e ON e.id = a.employee_id
    LEFT JOIN shifts s ON s.id = a.shift_id
"#;

/// Attendance of one employee within `period`, oldest first.
pub async fn fetch_employee_records(
    pool: &MySqlPool,
    employee_id: u64,
    period: &ReportPeriod,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let sql = format!(
        "{RECORD_SELECT} WHERE a.employee_id = ? AND a.date BETWEEN ? AND ? ORDER BY a.date, a.id"
    );

    let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(employee_id)
        .bind(period.start)
        .bind(period.end)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(AttendanceRecord::from).collect())
}

/// Attendance of every employee in a department within `period`.
///
/// The department filter runs on the joined employee, so orphaned attendance
/// rows never reach the aggregator from here.
pub async fn fetch_department_records(
    pool: &MySqlPool,
    department_id: u64,
    period: &ReportPeriod,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let sql = format!(
        "{RECORD_SELECT} WHERE e.department_id = ? AND a.date BETWEEN ? AND ? ORDER BY a.date, a.id"
    );

    let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(department_id)
        .bind(period.start)
        .bind(period.end)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(AttendanceRecord::from).collect())
}
