// src/models/employees.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{validate_cpf, validate_not_blank};
use crate::models::auth::UserStatus;

// Visão pública do funcionário, já com cargo e departamento resolvidos
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    #[schema(example = "Maria Souza")]
    pub name: String,
    #[schema(example = "maria@fyzen.com.br")]
    pub email: String,
    #[schema(example = "52998224725")]
    pub cpf: String,
    pub phone: Option<String>,
    pub status: UserStatus,
    pub avatar_url: Option<String>,
    pub hired_at: Option<NaiveDate>,
    pub role_id: Option<Uuid>,
    #[schema(example = "Analista de RH")]
    pub role_name: Option<String>,
    pub department_id: Option<Uuid>,
    #[schema(example = "Recursos Humanos")]
    pub department_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeePayload {
    #[validate(
        length(min = 2, max = 120, message = "O nome deve ter entre 2 e 120 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(custom(function = "validate_cpf"))]
    #[schema(example = "529.982.247-25")]
    pub cpf: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(length(max = 30, message = "Telefone muito longo."))]
    pub phone: Option<String>,

    pub role_id: Option<Uuid>,
    pub avatar_url: Option<String>,
    pub hired_at: Option<NaiveDate>,
}

// Atualização parcial: campos ausentes ficam como estão
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeePayload {
    #[validate(
        length(min = 2, max = 120, message = "O nome deve ter entre 2 e 120 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(custom(function = "validate_cpf"))]
    pub cpf: Option<String>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,

    #[validate(length(max = 30, message = "Telefone muito longo."))]
    pub phone: Option<String>,

    pub role_id: Option<Uuid>,
    pub status: Option<UserStatus>,
    pub avatar_url: Option<String>,
    pub hired_at: Option<NaiveDate>,
}

/// Campos já normalizados que o repositório grava.
#[derive(Debug, Default)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub cpf: Option<String>,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
    pub status: Option<UserStatus>,
    pub avatar_url: Option<String>,
    pub hired_at: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmployeeFilters {
    pub status: Option<UserStatus>,
    pub department_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    /// Busca por nome, e-mail ou CPF
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected_on_update() {
        let payload = UpdateEmployeePayload { name: Some("   ".into()), ..Default::default() };
        assert!(payload.validate().is_err());

        let payload = UpdateEmployeePayload { name: Some("Ana Lima".into()), ..Default::default() };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn absent_fields_are_not_validated() {
        assert!(UpdateEmployeePayload::default().validate().is_ok());
    }
}
