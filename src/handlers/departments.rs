// src/handlers/departments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::blank_to_none, error::AppError, validation::validate_not_blank},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermDepartmentsWrite, RequirePermission},
    },
    models::departments::Department,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDepartmentPayload {
    #[validate(
        length(min = 2, max = 80, message = "O nome do departamento deve ter entre 2 e 80 caracteres."),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Recursos Humanos")]
    pub name: String,

    #[validate(length(max = 500, message = "Descrição muito longa."))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDepartmentPayload {
    #[validate(
        length(min = 2, max = 80, message = "O nome do departamento deve ter entre 2 e 80 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Descrição muito longa."))]
    pub description: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "Departments",
    responses(
        (status = 200, description = "Departamentos com contagem de cargos e funcionários", body = Vec<Department>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_departments(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Department>>, AppError> {
    let departments = app_state.department_service.list().await?;
    Ok(Json(departments))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = "Departments",
    params(("id" = Uuid, Path, description = "ID do departamento")),
    responses(
        (status = 200, description = "Departamento", body = Department),
        (status = 404, description = "Departamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_department(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Department>, AppError> {
    let department = app_state.department_service.get(id).await?;
    Ok(Json(department))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "Departments",
    request_body = CreateDepartmentPayload,
    responses(
        (status = 201, description = "Departamento criado", body = Department),
        (status = 409, description = "Já existe um departamento com este nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_department(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermDepartmentsWrite>,
    Json(payload): Json<CreateDepartmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let description = blank_to_none(payload.description.as_deref());
    let department = app_state.department_service
        .create(&payload.name, description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    tag = "Departments",
    params(("id" = Uuid, Path, description = "ID do departamento")),
    request_body = UpdateDepartmentPayload,
    responses(
        (status = 200, description = "Departamento atualizado", body = Department),
        (status = 404, description = "Departamento não encontrado"),
        (status = 409, description = "Já existe um departamento com este nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_department(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermDepartmentsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDepartmentPayload>,
) -> Result<Json<Department>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let department = app_state.department_service
        .update(id, payload.name.as_deref(), payload.description.as_deref())
        .await?;

    Ok(Json(department))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = "Departments",
    params(("id" = Uuid, Path, description = "ID do departamento")),
    responses(
        (status = 204, description = "Departamento removido"),
        (status = 404, description = "Departamento não encontrado"),
        (status = 409, description = "Departamento ainda possui cargos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_department(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermDepartmentsWrite>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.department_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_department_name_is_rejected_on_update() {
        let payload = UpdateDepartmentPayload { name: Some("   ".into()), description: None };
        assert!(payload.validate().is_err());

        let payload = UpdateDepartmentPayload { name: Some("Financeiro".into()), description: None };
        assert!(payload.validate().is_ok());
    }
}
