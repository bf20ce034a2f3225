use crate::api::department::DepartmentResponse;
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeResponse, UpdateEmployee};
use crate::api::session::SessionView;
use crate::api::timekeeping::{RecordListResponse, SummaryResponse};
use crate::model::attendance::{AttendanceRecord, ClassifiedRecord, ShiftRef};
use crate::model::department::Department;
use crate::model::employee::{Employee, EmployeeView};
use crate::model::summary::{AttendanceStatus, EmployeeSalarySummary};
use crate::timekeeping::scan::ScanEvent;
use crate::timekeeping::session::WorkingDuration;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Timekeeping API",
        version = "1.0.0",
        description = r#"
## Timekeeping

QR check-in/check-out and the payroll-facing attendance figures derived from it.

### Key Features
- **Scanning**
  - Check in and check out from a decoded QR token, duplicate scans are ignored
  - Live elapsed working time of the open session
- **Attendance status**
  - Each record is On time, Late, Early leave, Late and early leave, or Undetermined
  - A check-in counts as late only past shift start plus the late threshold
- **Monthly summary**
  - Work days and late days per employee for a department, exportable as CSV
- **Roster**
  - HR manages the employees of its department, Admin manages everyone

### Security
All endpoints require a **JWT Bearer** access token. Department views are limited to HR and Admin.
"#,
    ),
    paths(
        crate::api::session::scan,
        crate::api::session::current_session,
        crate::api::session::cancel_session,

        crate::api::timekeeping::employee_records,
        crate::api::timekeeping::department_records,
        crate::api::timekeeping::department_summary,
        crate::api::timekeeping::export_department_summary,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::department::get_department
    ),
    components(
        schemas(
            ScanEvent,
            SessionView,
            WorkingDuration,
            ShiftRef,
            AttendanceRecord,
            AttendanceStatus,
            ClassifiedRecord,
            RecordListResponse,
            EmployeeSalarySummary,
            SummaryResponse,
            Employee,
            EmployeeView,
            CreateEmployee,
            UpdateEmployee,
            EmployeeListResponse,
            EmployeeResponse,
            Department,
            DepartmentResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Timekeeping", description = "Attendance scanning and timekeeping APIs"),
        (name = "Employee", description = "Department roster management"),
        (name = "Department", description = "Department lookup"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
