use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[schema(example = 1)]
    pub id: u64,

    #[sqlx(rename = "name")]
    #[schema(example = "Engineering")]
    pub department_name: String,
}
