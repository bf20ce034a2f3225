use actix_web::{HttpResponse, Responder, error::ErrorForbidden, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::TimekeepingError;
use crate::model::employee::{Employee, EmployeeView};
use crate::model::role::Role;

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;
const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "+8801712345678")]
    pub phone: Option<String>,
    /// Defaults to the caller's own department
    #[schema(example = 1)]
    pub department_id: Option<u64>,
    #[schema(example = 2)]
    pub shift_id: Option<u64>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department_id: Option<u64>,
    pub shift_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    #[param(example = 1)]
    pub page: Option<u32>,
    #[param(example = 20)]
    pub per_page: Option<u32>,
    /// Admin only; HR always lists its own department
    pub department_id: Option<u64>,
    /// Matches full name or email
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListResponse {
    pub success: bool,
    pub data: Vec<EmployeeView>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeResponse {
    pub success: bool,
    pub data: EmployeeView,
}

fn invalid(reason: impl Into<String>) -> TimekeepingError {
    TimekeepingError::InvalidEmployee {
        reason: reason.into(),
    }
}

fn checked_name(field: &str, value: &str) -> Result<String, TimekeepingError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(format!("{field} must not be blank")));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(invalid(format!("{field} is longer than {MAX_NAME_LEN} characters")));
    }
    Ok(value.to_string())
}

fn checked_email(value: &str) -> Result<String, TimekeepingError> {
    let value = value.trim();
    let well_formed = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if well_formed {
        Ok(value.to_string())
    } else {
        Err(invalid(format!("'{value}' is not an email address")))
    }
}

fn checked_phone(value: &str) -> Result<String, TimekeepingError> {
    let value = value.trim();
    let digits = value.chars().filter(char::is_ascii_digit).count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));

    if allowed && (6..=15).contains(&digits) {
        Ok(value.to_string())
    } else {
        Err(invalid(format!("'{value}' is not a phone number")))
    }
}

/// Blank optional contact fields are stored as NULL on create.
fn optional_contact(
    value: Option<String>,
    check: fn(&str) -> Result<String, TimekeepingError>,
) -> Result<Option<String>, TimekeepingError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => check(v).map(Some),
    }
}

impl CreateEmployee {
    pub fn validate(self) -> Result<Self, TimekeepingError> {
        Ok(Self {
            first_name: checked_name("firstName", &self.first_name)?,
            last_name: checked_name("lastName", &self.last_name)?,
            email: optional_contact(self.email, checked_email)?,
            phone: optional_contact(self.phone, checked_phone)?,
            department_id: self.department_id,
            shift_id: self.shift_id,
        })
    }
}

impl UpdateEmployee {
    pub fn validate(self) -> Result<Self, TimekeepingError> {
        let changes = Self {
            first_name: self
                .first_name
                .map(|v| checked_name("firstName", &v))
                .transpose()?,
            last_name: self
                .last_name
                .map(|v| checked_name("lastName", &v))
                .transpose()?,
            email: self.email.map(|v| checked_email(&v)).transpose()?,
            phone: self.phone.map(|v| checked_phone(&v)).transpose()?,
            department_id: self.department_id,
            shift_id: self.shift_id,
        };

        if changes.is_empty() {
            return Err(invalid("no fields to update"));
        }
        Ok(changes)
    }

    fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.department_id.is_none()
            && self.shift_id.is_none()
    }
}

/// Department a listing is restricted to. `None` means every department,
/// which only Admin gets.
fn listing_department(auth: &AuthUser, requested: Option<u64>) -> actix_web::Result<Option<u64>> {
    auth.require_hr_or_admin()?;

    let department_id = match auth.role {
        Role::Admin => requested,
        _ => requested.or(auth.department_id),
    };

    match department_id {
        Some(id) => {
            auth.require_access_to_department(id)?;
            Ok(Some(id))
        }
        None if auth.role == Role::Admin => Ok(None),
        None => Err(ErrorForbidden("No department assigned")),
    }
}

fn is_constraint_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "success": false,
        "message": "Employee not found"
    }))
}

async fn fetch_employee(pool: &MySqlPool, employee_id: u64) -> actix_web::Result<Option<Employee>> {
    sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, first_name, last_name, email, phone, department_id, shift_id
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee");
        ErrorInternalServerError("Internal Server Error")
    })
}

const EMPLOYEE_FILTER: &str = r#"
    WHERE (? IS NULL OR department_id = ?)
    AND (? IS NULL OR CONCAT(first_name, ' ', last_name) LIKE ? OR email LIKE ?)
"#;

/// List employees
#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 403, description = "HR/Admin only, HR limited to its department")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let department_id = listing_department(&auth, query.department_id)?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    let offset = u64::from(page - 1) * u64::from(per_page);
    let like = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));

    let count_sql = format!("SELECT COUNT(*) FROM employees {EMPLOYEE_FILTER}");
    let total = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(department_id)
        .bind(department_id)
        .bind(like.as_deref())
        .bind(like.as_deref())
        .bind(like.as_deref())
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count employees");
            ErrorInternalServerError("Database error")
        })?;

    let data_sql = format!(
        "SELECT id, first_name, last_name, email, phone, department_id, shift_id \
         FROM employees {EMPLOYEE_FILTER} ORDER BY id DESC LIMIT ? OFFSET ?"
    );
    let employees = sqlx::query_as::<_, Employee>(&data_sql)
        .bind(department_id)
        .bind(department_id)
        .bind(like.as_deref())
        .bind(like.as_deref())
        .bind(like.as_deref())
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employees");
            ErrorInternalServerError("Database error")
        })?;

    debug!(?department_id, page, per_page, total, "Employees listed");

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        success: true,
        data: employees.into_iter().map(EmployeeView::from).collect(),
        page,
        per_page,
        total,
    }))
}

/// Get employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    responses(
        (status = 200, body = EmployeeResponse),
        (status = 403, description = "Not allowed to view this employee"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let Some(employee) = fetch_employee(pool.get_ref(), employee_id).await? else {
        return Ok(not_found());
    };

    // everyone may read their own profile
    if auth.employee_id != Some(employee.id) {
        auth.require_access_to_department(employee.department_id)?;
    }

    Ok(HttpResponse::Ok().json(EmployeeResponse {
        success: true,
        data: employee.into(),
    }))
}

/// Create employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({
            "success": true,
            "id": 1001
        })),
        (status = 400, description = "Invalid payload, duplicate email, or unknown shift"),
        (status = 403, description = "HR/Admin only, HR limited to its department")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let payload = payload.into_inner().validate()?;

    let department_id = payload
        .department_id
        .or(auth.department_id)
        .ok_or_else(|| invalid("departmentId is required"))?;
    auth.require_access_to_department(department_id)?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees (first_name, last_name, email, phone, department_id, shift_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(department_id)
    .bind(payload.shift_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(done) => {
            let id = done.last_insert_id();
            info!(employee_id = id, department_id, created_by = auth.user_id, "Employee created");
            Ok(HttpResponse::Created().json(json!({
                "success": true,
                "message": "Employee created successfully",
                "id": id
            })))
        }

        Err(e) if is_constraint_violation(&e) => Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Email already in use, or unknown department or shift"
        }))),

        Err(e) => {
            error!(error = %e, department_id, "Failed to create employee");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Update employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Object, example = json!({
            "success": true,
            "message": "Employee updated successfully"
        })),
        (status = 400, description = "Invalid payload, duplicate email, or unknown shift"),
        (status = 403, description = "HR/Admin only, HR limited to its department"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateEmployee>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_hr_or_admin()?;
    let changes = payload.into_inner().validate()?;

    // moving someone needs access to the destination as well
    if let Some(target) = changes.department_id {
        auth.require_access_to_department(target)?;
    }

    let Some(current) = fetch_employee(pool.get_ref(), employee_id).await? else {
        return Ok(not_found());
    };
    auth.require_access_to_department(current.department_id)?;

    let result = sqlx::query(
        r#"
        UPDATE employees
        SET first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            email = COALESCE(?, email),
            phone = COALESCE(?, phone),
            department_id = COALESCE(?, department_id),
            shift_id = COALESCE(?, shift_id)
        WHERE id = ?
        "#,
    )
    .bind(&changes.first_name)
    .bind(&changes.last_name)
    .bind(&changes.email)
    .bind(&changes.phone)
    .bind(changes.department_id)
    .bind(changes.shift_id)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            info!(employee_id, updated_by = auth.user_id, "Employee updated");
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Employee updated successfully"
            })))
        }

        Err(e) if is_constraint_violation(&e) => Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Email already in use, or unknown department or shift"
        }))),

        Err(e) => {
            error!(error = %e, employee_id, "Failed to update employee");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Delete employee
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "success": true,
            "message": "Successfully deleted"
        })),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee still has attendance records")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => Ok(not_found()),

        Ok(_) => {
            info!(employee_id, deleted_by = auth.user_id, "Employee deleted");
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Successfully deleted"
            })))
        }

        Err(e) if is_constraint_violation(&e) => Ok(HttpResponse::Conflict().json(json!({
            "success": false,
            "message": "Employee still has attendance records"
        }))),

        Err(e) => {
            error!(error = %e, employee_id, "Failed to delete employee");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::token_for;
    use crate::auth::middleware::auth_middleware;
    use crate::config::Config;
    use crate::models::TokenType;
    use crate::routes::employee_scope;
    use actix_web::middleware::from_fn;
    use actix_web::{App, http::StatusCode, test, web::Data};
    use sqlx::mysql::MySqlPoolOptions;
    use std::time::Duration;

    fn user(role: Role, department_id: Option<u64>) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "u".to_string(),
            role,
            employee_id: None,
            department_id,
        }
    }

    fn create(first_name: &str, email: Option<&str>, phone: Option<&str>) -> CreateEmployee {
        CreateEmployee {
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            department_id: Some(1),
            shift_id: None,
        }
    }

    macro_rules! app {
        () => {{
            let config = Config::for_tests();
            let pool = MySqlPoolOptions::new()
                .acquire_timeout(Duration::from_millis(200))
                .connect_lazy(&config.database_url)
                .unwrap();
            test::init_service(
                App::new()
                    .app_data(Data::new(pool))
                    .app_data(Data::new(config))
                    .service(
                        web::scope("/api")
                            .wrap(from_fn(auth_middleware))
                            .service(employee_scope()),
                    ),
            )
            .await
        }};
    }

    fn bearer(role: u8, department_id: Option<u64>) -> (&'static str, String) {
        let token = token_for(role, None, department_id, TokenType::Access, "test-secret");
        ("Authorization", format!("Bearer {token}"))
    }

    #[::core::prelude::v1::test]
    fn create_payload_is_trimmed_and_blank_contacts_dropped() {
        let payload = create("  John ", Some(" "), Some("+880 1712-345678"))
            .validate()
            .unwrap();
        assert_eq!(payload.first_name, "John");
        assert_eq!(payload.email, None);
        assert_eq!(payload.phone.as_deref(), Some("+880 1712-345678"));
    }

    #[::core::prelude::v1::test]
    fn create_payload_rejects_bad_fields() {
        assert!(create(" ", None, None).validate().is_err());
        assert!(create(&"x".repeat(65), None, None).validate().is_err());
        assert!(create("John", Some("john@"), None).validate().is_err());
        assert!(create("John", Some("a@b@c.com"), None).validate().is_err());
        assert!(create("John", None, Some("call me")).validate().is_err());
        assert!(create("John", None, Some("12345")).validate().is_err());
        assert!(create("John", Some("john@corp.io"), Some("(028) 123456")).validate().is_ok());
    }

    #[::core::prelude::v1::test]
    fn update_needs_at_least_one_valid_field() {
        assert!(UpdateEmployee::default().validate().is_err());

        let blank_name = UpdateEmployee {
            last_name: Some("".to_string()),
            ..Default::default()
        };
        assert!(blank_name.validate().is_err());

        let shift_only = UpdateEmployee {
            shift_id: Some(3),
            ..Default::default()
        };
        assert_eq!(shift_only.validate().unwrap().shift_id, Some(3));
    }

    #[::core::prelude::v1::test]
    fn hr_lists_only_its_department() {
        let hr = user(Role::Hr, Some(2));
        assert_eq!(listing_department(&hr, None).unwrap(), Some(2));
        assert_eq!(listing_department(&hr, Some(2)).unwrap(), Some(2));
        assert!(listing_department(&hr, Some(3)).is_err());
        assert!(listing_department(&user(Role::Hr, None), None).is_err());
        assert!(listing_department(&user(Role::Employee, Some(2)), None).is_err());
    }

    #[::core::prelude::v1::test]
    fn admin_lists_everyone_unless_filtered() {
        let admin = user(Role::Admin, Some(1));
        assert_eq!(listing_department(&admin, None).unwrap(), None);
        assert_eq!(listing_department(&admin, Some(4)).unwrap(), Some(4));
    }

    #[actix_web::test]
    async fn employees_cannot_list_employees() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/employees")
            .insert_header(bearer(3, Some(1)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn hr_cannot_create_in_another_department() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/employees")
            .insert_header(bearer(2, Some(1)))
            .set_json(json!({"firstName": "Jane", "lastName": "Roe", "departmentId": 2}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn invalid_payload_is_rejected_before_storage() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/employees")
            .insert_header(bearer(2, Some(1)))
            .set_json(json!({"firstName": "Jane", "lastName": "Roe", "email": "nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn hr_cannot_move_employee_out_of_reach() {
        let app = app!();
        let req = test::TestRequest::put()
            .uri("/api/employees/5")
            .insert_header(bearer(2, Some(1)))
            .set_json(json!({"departmentId": 9}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri("/api/employees/5")
            .insert_header(bearer(2, Some(1)))
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn only_admin_deletes() {
        let app = app!();
        let req = test::TestRequest::delete()
            .uri("/api/employees/5")
            .insert_header(bearer(2, Some(1)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
