use crate::model::role::Role;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorForbidden,
    error::ErrorUnauthorized,
};
use futures::future::{Ready, ready};

/// Caller identity placed in request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
    pub department_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Missing token")),
        )
    }
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if self.role.is_manager() {
            Ok(())
        } else {
            Err(ErrorForbidden("HR/Admin only"))
        }
    }

    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ErrorForbidden("Admin only"))
        }
    }

    /// Employee id of the caller, required for scanning and sessions.
    pub fn require_employee(&self) -> actix_web::Result<u64> {
        self.employee_id
            .ok_or_else(|| ErrorForbidden("No employee profile"))
    }

    /// Employees read their own timekeeping; HR/Admin read anyone's.
    pub fn require_access_to_employee(&self, employee_id: u64) -> actix_web::Result<()> {
        if self.role.is_manager() || self.employee_id == Some(employee_id) {
            Ok(())
        } else {
            Err(ErrorForbidden("Not allowed to view this employee"))
        }
    }

    /// HR is limited to its own department, Admin sees every department.
    pub fn require_access_to_department(&self, department_id: u64) -> actix_web::Result<()> {
        self.require_hr_or_admin()?;
        if self.role == Role::Admin || self.department_id == Some(department_id) {
            Ok(())
        } else {
            Err(ErrorForbidden("Not allowed to view this department"))
        }
    }
}
