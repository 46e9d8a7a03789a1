// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("CPF já existe")]
    CpfAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário inativo")]
    InactiveUser,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Não encontrado: {0}")]
    NotFound(String),

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Conteúdo grande demais: {0}")]
    PayloadTooLarge(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` captura o contexto de qualquer erro inesperado.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),
}

/// Corpo de erro que vai para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: "Um ou mais campos são inválidos.".into(),
                    details: Some(json!(details)),
                }
            }
            AppError::BadRequest(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg),
            AppError::EmailAlreadyExists => ApiError::new(StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::CpfAlreadyExists => ApiError::new(StatusCode::CONFLICT, "Este CPF já está cadastrado."),
            AppError::InvalidCredentials => ApiError::new(StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos."),
            AppError::InvalidToken => ApiError::new(StatusCode::UNAUTHORIZED, "Sessão inválida ou expirada."),
            AppError::InactiveUser => ApiError::new(StatusCode::FORBIDDEN, "Este usuário está inativo."),
            AppError::UserNotFound => ApiError::new(StatusCode::NOT_FOUND, "Usuário não encontrado."),
            AppError::Forbidden(msg) => ApiError::new(StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => ApiError::new(StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => ApiError::new(StatusCode::CONFLICT, msg),
            AppError::PayloadTooLarge(msg) => ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                ApiError::new(StatusCode::NOT_FOUND, "Registro não encontrado.")
            }

            // Todos os outros erros viram 500. O detalhe só vai para o log.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn status_of(err: AppError) -> StatusCode {
        ApiError::from(err).status
    }

    #[test]
    fn maps_errors_to_http_status() {
        assert_eq!(status_of(AppError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::Forbidden("roles:write".into())), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::InactiveUser), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::NotFound("cargo".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::EmailAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status_of(AppError::CpfAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status_of(AppError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(status_of(AppError::PayloadTooLarge("x".into())), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            status_of(AppError::DatabaseError(sqlx::Error::RowNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::InternalServerError(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = ApiError::from(AppError::InternalServerError(anyhow::anyhow!("senha do banco: 123")));
        assert_eq!(api.error, "Ocorreu um erro inesperado.");
        assert!(api.details.is_none());
    }

    #[test]
    fn validation_errors_list_messages_per_field() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("O nome é obrigatório.".into());
        errors.add("name", err);

        let api = ApiError::from(AppError::ValidationError(errors));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap_or_default();
        assert_eq!(details["name"][0], "O nome é obrigatório.");
    }
}
