// src/handlers/uploads.rs

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::uploads::UploadResponse,
};

/// Campo do formulário que carrega o arquivo.
const FILE_FIELD: &str = "file";

#[utoipa::path(
    post,
    path = "/api/uploads",
    tag = "Uploads",
    request_body(content_type = "multipart/form-data", description = "Campo `file` com o arquivo"),
    responses(
        (status = 201, description = "Arquivo salvo", body = UploadResponse),
        (status = 400, description = "Arquivo ausente, vazio ou de tipo não permitido"),
        (status = 413, description = "Arquivo maior que o limite")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_file(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;

        let response = app_state.upload_service
            .store(file_name.as_deref(), content_type.as_deref(), &bytes)
            .await?;

        tracing::debug!("Upload de {} por {}", response.url, user.id);
        return Ok((StatusCode::CREATED, Json(response)));
    }

    Err(AppError::BadRequest("Envie o arquivo no campo 'file'.".into()))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge("O arquivo excede o tamanho máximo permitido.".into());
    }
    AppError::BadRequest(format!("Formulário inválido: {}", e.body_text()))
}
