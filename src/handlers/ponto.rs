// src/handlers/ponto.rs

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
        rbac::{has_permission, PermPontoManage, PermPontoReadAll, PermissionDef, RequirePermission},
    },
    models::ponto::{
        AjustarPontoPayload, LancarPontoPayload, PontoListResponse, PontoPeriodo, PontoRegistro,
        RegistrarPontoPayload,
    },
};

#[utoipa::path(
    post,
    path = "/api/ponto",
    tag = "Ponto",
    request_body = RegistrarPontoPayload,
    responses(
        (status = 201, description = "Batida registrada", body = PontoRegistro),
        (status = 409, description = "Batida repetida em menos de um minuto")
    ),
    security(("api_jwt" = []))
)]
pub async fn registrar_ponto(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    payload: Option<Json<RegistrarPontoPayload>>,
) -> Result<impl IntoResponse, AppError> {
    // Corpo opcional: sem JSON o tipo é inferido
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    payload.validate().map_err(AppError::ValidationError)?;

    let registro = app_state.ponto_service.registrar(user.id, &payload).await?;

    Ok((StatusCode::CREATED, Json(registro)))
}

#[utoipa::path(
    get,
    path = "/api/ponto",
    tag = "Ponto",
    params(PontoPeriodo),
    responses(
        (status = 200, description = "Batidas do período e apuração de horas", body = PontoListResponse),
        (status = 400, description = "Período inválido"),
        (status = 403, description = "Consulta de outro funcionário sem ponto:read_all")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_ponto(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(periodo): Query<PontoPeriodo>,
) -> Result<Json<PontoListResponse>, AppError> {
    let alvo = periodo.user_id.unwrap_or(user.id);

    if alvo != user.id && !has_permission::<PermPontoReadAll>(&app_state, user.id).await? {
        return Err(AppError::Forbidden(format!(
            "Você precisa da permissão '{}' para ver o ponto de outro funcionário.",
            PermPontoReadAll::slug()
        )));
    }

    let response = app_state.ponto_service
        .listar(alvo, periodo.from, periodo.to)
        .await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/ponto/lancamentos",
    tag = "Ponto",
    request_body = LancarPontoPayload,
    responses(
        (status = 201, description = "Batida lançada manualmente", body = PontoRegistro),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn lancar_ponto(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _guard: RequirePermission<PermPontoManage>,
    Json(payload): Json<LancarPontoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let registro = app_state.ponto_service.lancar(actor.id, &payload).await?;

    Ok((StatusCode::CREATED, Json(registro)))
}

#[utoipa::path(
    put,
    path = "/api/ponto/{id}",
    tag = "Ponto",
    params(("id" = Uuid, Path, description = "ID do registro de ponto")),
    request_body = AjustarPontoPayload,
    responses(
        (status = 200, description = "Registro ajustado", body = PontoRegistro),
        (status = 404, description = "Registro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn ajustar_ponto(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _guard: RequirePermission<PermPontoManage>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AjustarPontoPayload>,
) -> Result<Json<PontoRegistro>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let registro = app_state.ponto_service.ajustar(actor.id, id, &payload).await?;
    Ok(Json(registro))
}

#[utoipa::path(
    delete,
    path = "/api/ponto/{id}",
    tag = "Ponto",
    params(("id" = Uuid, Path, description = "ID do registro de ponto")),
    responses(
        (status = 204, description = "Registro removido"),
        (status = 404, description = "Registro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn excluir_ponto(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermPontoManage>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.ponto_service.excluir(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
