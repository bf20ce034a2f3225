use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1001,
        "firstName": "John",
        "lastName": "Doe",
        "email": "john.doe@company.com",
        "phone": "+8801712345678",
        "departmentId": 1,
        "shiftId": 2
    })
)]
pub struct Employee {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[schema(nullable = true)]
    pub email: Option<String>,
    #[schema(nullable = true)]
    pub phone: Option<String>,
    pub department_id: u64,
    /// Shift stamped onto each new attendance row at check-in
    #[schema(nullable = true)]
    pub shift_id: Option<u64>,
}

impl Employee {
    /// Same "first last" form the attendance listings carry.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Employee as listed to managers, with the display name precomputed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    #[serde(flatten)]
    pub employee: Employee,
    #[schema(example = "John Doe")]
    pub full_name: String,
}

impl From<Employee> for EmployeeView {
    fn from(employee: Employee) -> Self {
        let full_name = employee.full_name();
        Self {
            employee,
            full_name,
        }
    }
}
