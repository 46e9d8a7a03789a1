// src/models/departments.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    #[schema(example = "Recursos Humanos")]
    pub name: String,
    #[schema(example = "Admissões, folha e benefícios")]
    pub description: Option<String>,
    #[schema(example = 3)]
    pub role_count: i64,
    #[schema(example = 12)]
    pub employee_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
