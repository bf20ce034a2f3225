use actix_web::{HttpResponse, Responder, http::header, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::db::{fetch_department_records, fetch_employee_records};
use crate::error::TimekeepingError;
use crate::model::attendance::{AttendanceRecord, ClassifiedRecord};
use crate::model::summary::EmployeeSalarySummary;
use crate::timekeeping::aggregator::aggregate;
use crate::timekeeping::classifier::classify;
use crate::timekeeping::export::{CsvExporter, SummaryExporter};
use crate::timekeeping::period::ReportPeriod;

/// Date range selection. `month` wins over explicit dates; missing dates
/// default to the bounds of the current month.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    #[param(value_type = Option<String>, format = Date, example = "2026-01-01")]
    pub start_date: Option<NaiveDate>,

    #[param(value_type = Option<String>, format = Date, example = "2026-01-31")]
    pub end_date: Option<NaiveDate>,

    #[param(example = "2026-01")]
    pub month: Option<String>,
}

impl PeriodQuery {
    pub fn resolve(&self, today: NaiveDate) -> Result<ReportPeriod, TimekeepingError> {
        if let Some(month) = &self.month {
            return ReportPeriod::from_month(month);
        }

        let current = ReportPeriod::month_of(today).ok_or_else(|| TimekeepingError::InvalidMonth {
            value: today.to_string(),
        })?;

        ReportPeriod::new(
            self.start_date.unwrap_or(current.start),
            self.end_date.unwrap_or(current.end),
        )
    }
}

#[derive(Serialize, ToSchema)]
pub struct RecordListResponse {
    pub success: bool,
    pub data: Vec<ClassifiedRecord>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub success: bool,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub data: Vec<EmployeeSalarySummary>,
}

fn classified(records: Vec<AttendanceRecord>, late_threshold_minutes: i32) -> Vec<ClassifiedRecord> {
    records
        .into_iter()
        .map(|record| {
            let status = classify(&record, late_threshold_minutes);
            ClassifiedRecord {
                record,
                status,
                is_late: status.is_late(),
            }
        })
        .collect()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn department_attendance(
    pool: &MySqlPool,
    department_id: u64,
    period: &ReportPeriod,
) -> actix_web::Result<Vec<AttendanceRecord>> {
    fetch_department_records(pool, department_id, period)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, department_id, "Failed to fetch department attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })
}

/// Attendance of one employee with derived status
#[utoipa::path(
    get,
    path = "/api/timekeeping/employee/{employee_id}",
    params(
        ("employee_id", description = "Employee ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, body = RecordListResponse),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Timekeeping"
)]
pub async fn employee_records(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_access_to_employee(employee_id)?;
    let period = query.resolve(today())?;

    let records = fetch_employee_records(pool.get_ref(), employee_id, &period)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch employee attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    debug!(employee_id, count = records.len(), requested_by = auth.user_id, "Employee attendance fetched");

    Ok(HttpResponse::Ok().json(RecordListResponse {
        success: true,
        data: classified(records, config.late_threshold_minutes),
    }))
}

/// Attendance of a whole department with derived status
#[utoipa::path(
    get,
    path = "/api/timekeeping/department/{department_id}",
    params(
        ("department_id", description = "Department ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, body = RecordListResponse),
        (status = 400, description = "Invalid date range"),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Timekeeping"
)]
pub async fn department_records(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();
    auth.require_access_to_department(department_id)?;
    let period = query.resolve(today())?;

    let records = department_attendance(pool.get_ref(), department_id, &period).await?;

    Ok(HttpResponse::Ok().json(RecordListResponse {
        success: true,
        data: classified(records, config.late_threshold_minutes),
    }))
}

/// Per-employee work day and late day totals for payroll
#[utoipa::path(
    get,
    path = "/api/timekeeping/department/{department_id}/summary",
    params(
        ("department_id", description = "Department ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, body = SummaryResponse),
        (status = 400, description = "Invalid month or date range"),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Timekeeping"
)]
pub async fn department_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();
    auth.require_access_to_department(department_id)?;
    let period = query.resolve(today())?;

    let records = department_attendance(pool.get_ref(), department_id, &period).await?;

    Ok(HttpResponse::Ok().json(SummaryResponse {
        success: true,
        start_date: period.start,
        end_date: period.end,
        data: aggregate(&records, config.late_threshold_minutes),
    }))
}

/// Download the department summary as CSV
#[utoipa::path(
    get,
    path = "/api/timekeeping/department/{department_id}/summary/export",
    params(
        ("department_id", description = "Department ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "CSV attachment", body = String, content_type = "text/csv"),
        (status = 403, description = "HR/Admin only"),
        (status = 500, description = "Export failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Timekeeping"
)]
pub async fn export_department_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();
    auth.require_access_to_department(department_id)?;
    let period = query.resolve(today())?;

    let records = department_attendance(pool.get_ref(), department_id, &period).await?;
    let rows = aggregate(&records, config.late_threshold_minutes);

    let exporter = CsvExporter;
    let body = exporter.export(&rows)?;

    Ok(HttpResponse::Ok()
        .content_type(exporter.content_type())
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", exporter.file_name(&period)),
        ))
        .body(body))
}
