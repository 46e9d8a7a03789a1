// src/handlers/solicitacoes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{has_permission, PermSolicitacoesReview, RequirePermission},
    },
    models::solicitacoes::{
        CreateSolicitacaoPayload, DecisaoPayload, Solicitacao, SolicitacaoFilters,
        StatusSolicitacao,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MinhasSolicitacoesQuery {
    pub status: Option<StatusSolicitacao>,
}

#[utoipa::path(
    post,
    path = "/api/solicitacoes",
    tag = "Solicitacoes",
    request_body = CreateSolicitacaoPayload,
    responses(
        (status = 201, description = "Solicitação aberta", body = Solicitacao),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_solicitacao(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateSolicitacaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let solicitacao = app_state.solicitacao_service.create(user.id, &payload).await?;

    Ok((StatusCode::CREATED, Json(solicitacao)))
}

#[utoipa::path(
    get,
    path = "/api/solicitacoes/minhas",
    tag = "Solicitacoes",
    params(MinhasSolicitacoesQuery),
    responses(
        (status = 200, description = "Solicitações do usuário logado", body = Vec<Solicitacao>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_minhas(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<MinhasSolicitacoesQuery>,
) -> Result<Json<Vec<Solicitacao>>, AppError> {
    let solicitacoes = app_state.solicitacao_service.list_mine(user.id, query.status).await?;
    Ok(Json(solicitacoes))
}

#[utoipa::path(
    get,
    path = "/api/solicitacoes",
    tag = "Solicitacoes",
    params(SolicitacaoFilters),
    responses(
        (status = 200, description = "Todas as solicitações", body = Vec<Solicitacao>),
        (status = 403, description = "Sem a permissão solicitacoes:review")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_solicitacoes(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSolicitacoesReview>,
    Query(filters): Query<SolicitacaoFilters>,
) -> Result<Json<Vec<Solicitacao>>, AppError> {
    let solicitacoes = app_state.solicitacao_service.list(&filters).await?;
    Ok(Json(solicitacoes))
}

#[utoipa::path(
    get,
    path = "/api/solicitacoes/{id}",
    tag = "Solicitacoes",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Solicitação", body = Solicitacao),
        (status = 403, description = "Solicitação de outro funcionário"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_solicitacao(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Solicitacao>, AppError> {
    let can_review = has_permission::<PermSolicitacoesReview>(&app_state, user.id).await?;
    let solicitacao = app_state.solicitacao_service.get(user.id, can_review, id).await?;
    Ok(Json(solicitacao))
}

#[utoipa::path(
    post,
    path = "/api/solicitacoes/{id}/decisao",
    tag = "Solicitacoes",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    request_body = DecisaoPayload,
    responses(
        (status = 200, description = "Solicitação avaliada", body = Solicitacao),
        (status = 400, description = "Status de decisão inválido"),
        (status = 404, description = "Solicitação não encontrada"),
        (status = 409, description = "Solicitação não está mais pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn decidir_solicitacao(
    State(app_state): State<AppState>,
    AuthenticatedUser(avaliador): AuthenticatedUser,
    _guard: RequirePermission<PermSolicitacoesReview>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecisaoPayload>,
) -> Result<Json<Solicitacao>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let solicitacao = app_state.solicitacao_service
        .decidir(avaliador.id, id, &payload)
        .await?;
    Ok(Json(solicitacao))
}

#[utoipa::path(
    post,
    path = "/api/solicitacoes/{id}/cancelar",
    tag = "Solicitacoes",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Solicitação cancelada", body = Solicitacao),
        (status = 403, description = "Solicitação de outro funcionário"),
        (status = 409, description = "Solicitação não está mais pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancelar_solicitacao(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Solicitacao>, AppError> {
    let solicitacao = app_state.solicitacao_service.cancelar(user.id, id).await?;
    Ok(Json(solicitacao))
}
