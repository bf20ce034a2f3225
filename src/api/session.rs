use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::TimekeepingError;
use crate::timekeeping::registry::SessionRegistry;
use crate::timekeeping::scan::{ScanEvent, ScanGuard, ScanKind};
use crate::timekeeping::session::WorkingDuration;
use crate::timekeeping::time_utils::is_early_leave;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[schema(value_type = String, format = "uuid")]
    pub session_id: String,
    #[schema(value_type = String, format = DateTime)]
    pub started_at: DateTime<Utc>,
    pub elapsed: WorkingDuration,
    #[schema(example = "2:05:09")]
    pub display: String,
    /// Value published by the last periodic refresh
    pub last_refresh: Option<WorkingDuration>,
}

/// QR check-in / check-out
#[utoipa::path(
    post,
    path = "/api/timekeeping/scan",
    request_body = ScanEvent,
    responses(
        (status = 200, description = "Checked in or out", body = Object, example = json!({
            "success": true,
            "message": "Checked in successfully"
        })),
        (status = 202, description = "Duplicate scan ignored"),
        (status = 400, description = "Unknown scan type, already checked in, or no open check-in"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "A work session is already active"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Timekeeping"
)]
pub async fn scan(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    registry: web::Data<SessionRegistry>,
    guard: web::Data<ScanGuard>,
    payload: web::Json<ScanEvent>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = auth.require_employee()?;
    let kind = payload.kind()?;

    if !guard.admit(employee_id, kind, &payload.decoded_text).await {
        debug!(employee_id, %kind, "Duplicate scan ignored");
        return Ok(HttpResponse::Accepted().json(json!({
            "success": true,
            "duplicate": true,
            "message": "Duplicate scan ignored"
        })));
    }

    info!(employee_id, username = %auth.username, %kind, "Scan received");

    let outcome = match kind {
        ScanKind::Checkin => check_in(employee_id, pool.get_ref(), &registry).await,
        ScanKind::Checkout => check_out(employee_id, pool.get_ref(), &config, &registry).await,
    };

    // only a success may swallow the repeats; failures must be reported every time
    let succeeded = matches!(&outcome, Ok(resp) if resp.status().is_success());
    if !succeeded {
        guard.forget(employee_id, kind, &payload.decoded_text).await;
    }

    outcome
}

async fn check_in(
    employee_id: u64,
    pool: &MySqlPool,
    registry: &SessionRegistry,
) -> actix_web::Result<HttpResponse> {
    // claim the session first so a concurrent second scan cannot open another
    let session = registry.begin(employee_id, Utc::now())?;

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, shift_id, date, check_in, is_early_leave)
        SELECT e.id, e.shift_id, CURDATE(), CURTIME(), FALSE
        FROM employees e
        WHERE e.id = ?
        "#,
    )
    .bind(employee_id)
    .execute(pool)
    .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => {
            registry.end(employee_id);
            Ok(HttpResponse::NotFound().json(json!({
                "success": false,
                "message": "Employee not found"
            })))
        }

        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Checked in successfully",
            "sessionId": session.id.to_string(),
            "startedAt": session.started_at
        }))),

        Err(e) => {
            registry.end(employee_id);

            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "success": false,
                        "message": "Already checked in today"
                    })));
                }
            }

            tracing::error!(error = %e, employee_id, "Check-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

async fn check_out(
    employee_id: u64,
    pool: &MySqlPool,
    config: &Config,
    registry: &SessionRegistry,
) -> actix_web::Result<HttpResponse> {
    let open = sqlx::query_as::<_, (u64, Option<String>)>(
        r#"
        SELECT a.id, TIME_FORMAT(s.end_time, '%H:%i')
        FROM attendance a
        LEFT JOIN shifts s ON s.id = a.shift_id
        WHERE a.employee_id = ?
        AND a.date = CURDATE()
        AND a.check_out IS NULL
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to look up open check-in");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some((attendance_id, shift_end)) = open else {
        registry.end(employee_id);
        return Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "No active check-in found for today"
        })));
    };

    let now = Local::now().time();
    let check_out = now.format("%H:%M").to_string();
    let early_leave = match shift_end.as_deref() {
        Some(end) => is_early_leave(&check_out, end, config.early_leave_tolerance_minutes)
            .unwrap_or_else(|e| {
                warn!(error = %e, employee_id, attendance_id, "Shift end unreadable, early leave not flagged");
                false
            }),
        None => false,
    };

    sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = ?, is_early_leave = ?
        WHERE id = ?
        "#,
    )
    .bind(now)
    .bind(early_leave)
    .bind(attendance_id)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, attendance_id, "Check-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let worked = registry.elapsed(employee_id, Utc::now()).ok();
    registry.end(employee_id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Checked out successfully",
        "isEarlyLeave": early_leave,
        "workedTime": worked.map(|w| w.to_string())
    })))
}

/// Elapsed working time of the caller's active session
#[utoipa::path(
    get,
    path = "/api/timekeeping/session",
    responses(
        (status = 200, body = SessionView),
        (status = 404, description = "No active work session")
    ),
    security(("bearer_auth" = [])),
    tag = "Timekeeping"
)]
pub async fn current_session(
    auth: AuthUser,
    registry: web::Data<SessionRegistry>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let session = registry
        .current(employee_id)
        .ok_or(TimekeepingError::NotActive)?;
    let elapsed = registry.elapsed(employee_id, Utc::now())?;

    Ok(HttpResponse::Ok().json(SessionView {
        session_id: session.id.to_string(),
        started_at: session.started_at,
        elapsed,
        display: elapsed.to_string(),
        last_refresh: registry.snapshot(employee_id),
    }))
}

/// Cancel the caller's session; safe to repeat
#[utoipa::path(
    delete,
    path = "/api/timekeeping/session",
    responses(
        (status = 200, body = Object, example = json!({
            "success": true,
            "cancelled": true
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Timekeeping"
)]
pub async fn cancel_session(
    auth: AuthUser,
    registry: web::Data<SessionRegistry>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let cancelled = registry.end(employee_id).is_some();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "cancelled": cancelled
    })))
}
