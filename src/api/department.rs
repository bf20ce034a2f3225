use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::department::Department;

#[derive(Serialize, ToSchema)]
pub struct DepartmentResponse {
    pub success: bool,
    pub data: Department,
}

/// Department name shown next to timekeeping listings
#[utoipa::path(
    get,
    path = "/api/departments/{department_id}",
    params(("department_id", description = "Department ID")),
    responses(
        (status = 200, body = DepartmentResponse),
        (status = 403, description = "Not a member, and not HR/Admin of this department"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn get_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();

    // members read their own department
    if auth.department_id != Some(department_id) {
        auth.require_access_to_department(department_id)?;
    }

    let department = sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = ?")
        .bind(department_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, department_id, "Failed to fetch department");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match department {
        Some(data) => Ok(HttpResponse::Ok().json(DepartmentResponse {
            success: true,
            data,
        })),
        None => Ok(HttpResponse::NotFound().json(json!({
            "success": false,
            "message": "Department not found"
        }))),
    }
}
