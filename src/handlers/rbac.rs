// src/handlers/rbac.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::blank_to_none, error::AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermPermissionsManage, PermRolesWrite, RequirePermission},
    },
    models::rbac::{
        CreateRolePayload, Permission, RoleResponse, SetRolePermissionsPayload, UpdateRolePayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "RBAC",
    responses(
        (status = 200, description = "Cargos com departamento, contagem de funcionários e permissões", body = Vec<RoleResponse>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<RoleResponse>>, AppError> {
    let roles = app_state.rbac_service.list_roles().await?;
    Ok(Json(roles))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID do cargo")),
    responses(
        (status = 200, description = "Cargo", body = RoleResponse),
        (status = 404, description = "Cargo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_role(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RoleResponse>, AppError> {
    let role = app_state.rbac_service.get_role(id).await?;
    Ok(Json(role))
}

// POST /api/roles
#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "RBAC",
    request_body = CreateRolePayload,
    responses(
        (status = 201, description = "Cargo criado com as permissões conhecidas", body = RoleResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Já existe um cargo com este nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermRolesWrite>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let description = blank_to_none(payload.description.as_deref());
    let response = app_state.rbac_service
        .create_role_with_permissions(
            &payload.name,
            description.as_deref(),
            payload.department_id,
            &payload.permissions,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID do cargo")),
    request_body = UpdateRolePayload,
    responses(
        (status = 200, description = "Cargo atualizado", body = RoleResponse),
        (status = 404, description = "Cargo não encontrado"),
        (status = 409, description = "Nome já usado ou tentativa de renomear o cargo Administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermRolesWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<Json<RoleResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state.rbac_service
        .update_role(id, payload.name.as_deref(), payload.description.as_deref(), payload.department_id)
        .await?;

    let role = app_state.rbac_service.get_role(id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID do cargo")),
    responses(
        (status = 204, description = "Cargo removido"),
        (status = 404, description = "Cargo não encontrado"),
        (status = 409, description = "Cargo ainda possui funcionários ou é o Administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_role(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermRolesWrite>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.rbac_service.delete_role(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}/permissions",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID do cargo")),
    responses(
        (status = 200, description = "Slugs concedidos ao cargo", body = Vec<String>),
        (status = 404, description = "Cargo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_role_permissions(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<String>>, AppError> {
    let role = app_state.rbac_service.get_role(id).await?;
    Ok(Json(role.permissions))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}/permissions",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID do cargo")),
    request_body = SetRolePermissionsPayload,
    responses(
        (status = 200, description = "Conjunto de permissões substituído", body = RoleResponse),
        (status = 400, description = "Slug de permissão desconhecido"),
        (status = 404, description = "Cargo não encontrado"),
        (status = 409, description = "O cargo Administrador mantém todas as permissões")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_role_permissions(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermPermissionsManage>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRolePermissionsPayload>,
) -> Result<Json<RoleResponse>, AppError> {
    let role = app_state.rbac_service
        .set_role_permissions(id, &payload.permissions)
        .await?;
    Ok(Json(role))
}

// GET /api/permissions (Para o frontend montar a matriz de permissões)
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    responses(
        (status = 200, description = "Catálogo de permissões do sistema", body = Vec<Permission>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_permissions(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Permission>>, AppError> {
    let permissions = app_state.rbac_service.list_system_permissions().await?;
    Ok(Json(permissions))
}
