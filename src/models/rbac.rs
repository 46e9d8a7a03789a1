// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_blank;

// O que sai do banco (Tabela Roles), já com o departamento resolvido
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Analista de RH")]
    pub name: String,

    #[schema(example = "Cuida de admissões e do ponto")]
    pub description: Option<String>,

    pub department_id: Option<Uuid>,

    #[schema(example = "Recursos Humanos")]
    pub department_name: Option<String>,

    #[schema(example = 4)]
    pub user_count: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O que sai do banco (Tabela Permissions)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub id: Uuid,

    #[schema(example = "employees:read")]
    pub slug: String,

    #[schema(example = "Visualizar funcionários")]
    pub description: String,

    #[schema(example = "FUNCIONARIOS")]
    pub module: String,
}

// O Payload para criar um cargo
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    #[validate(
        length(min = 2, max = 80, message = "O nome do cargo deve ter entre 2 e 80 caracteres."),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Auxiliar Administrativo")]
    pub name: String,

    #[schema(example = "Apoio ao RH e ao financeiro")]
    pub description: Option<String>,

    pub department_id: Option<Uuid>,

    #[serde(default)]
    #[schema(example = json!(["employees:read"]))]
    pub permissions: Vec<String>, // Slugs das permissões
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolePayload {
    #[validate(
        length(min = 2, max = 80, message = "O nome do cargo deve ter entre 2 e 80 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRolePermissionsPayload {
    #[schema(example = json!(["employees:read", "employees:write"]))]
    pub permissions: Vec<String>,
}

// Resposta completa (Cargo + Lista de Permissões)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    #[serde(flatten)]
    pub role: Role,

    #[schema(example = json!(["employees:read", "ponto:read_all"]))]
    pub permissions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_role_name_is_rejected_on_update() {
        let payload = UpdateRolePayload { name: Some("    ".into()), description: None, department_id: None };
        assert!(payload.validate().is_err());

        let payload = UpdateRolePayload { name: None, description: Some("Só a descrição".into()), department_id: None };
        assert!(payload.validate().is_ok());
    }
}
