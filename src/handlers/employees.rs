// src/handlers/employees.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermEmployeesRead, PermEmployeesWrite, RequirePermission},
    },
    models::employees::{CreateEmployeePayload, Employee, EmployeeFilters, UpdateEmployeePayload},
};

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    params(EmployeeFilters),
    responses(
        (status = 200, description = "Lista de funcionários", body = Vec<Employee>),
        (status = 403, description = "Sem a permissão employees:read")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEmployeesRead>,
    Query(filters): Query<EmployeeFilters>,
) -> Result<Json<Vec<Employee>>, AppError> {
    let employees = app_state.employee_service.list(&filters).await?;
    Ok(Json(employees))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Funcionário", body = Employee),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_employee(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEmployeesRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, AppError> {
    let employee = app_state.employee_service.get(id).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Employees",
    request_body = CreateEmployeePayload,
    responses(
        (status = 201, description = "Funcionário cadastrado", body = Employee),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail ou CPF já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEmployeesWrite>,
    Json(payload): Json<CreateEmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let employee = app_state.employee_service.create(&payload).await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    request_body = UpdateEmployeePayload,
    responses(
        (status = 200, description = "Funcionário atualizado", body = Employee),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Funcionário não encontrado"),
        (status = 409, description = "E-mail ou CPF já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_employee(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _guard: RequirePermission<PermEmployeesWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeePayload>,
) -> Result<Json<Employee>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let employee = app_state.employee_service.update(actor.id, id, payload).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 204, description = "Funcionário desativado"),
        (status = 400, description = "Tentativa de desativar a si mesmo"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_employee(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _guard: RequirePermission<PermEmployeesWrite>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.employee_service.deactivate(actor.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
