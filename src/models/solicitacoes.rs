// src/models/solicitacoes.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::validation::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_solicitacao", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoSolicitacao {
    Ferias,
    Folga,
    Ausencia,
    Atestado,
    AjustePonto,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_solicitacao", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusSolicitacao {
    Pendente,
    Aprovada,
    Rejeitada,
    Cancelada,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Solicitacao {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "Maria Souza")]
    pub user_name: String,
    pub tipo: TipoSolicitacao,
    pub status: StatusSolicitacao,
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
    #[schema(example = "Consulta médica")]
    pub motivo: String,
    pub anexo_url: Option<String>,
    pub avaliado_por: Option<Uuid>,
    pub avaliado_em: Option<DateTime<Utc>>,
    pub observacao_avaliacao: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_periodo"))]
pub struct CreateSolicitacaoPayload {
    pub tipo: TipoSolicitacao,
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
    #[validate(
        length(min = 3, max = 1000, message = "O motivo deve ter entre 3 e 1000 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub motivo: String,
    pub anexo_url: Option<String>,
}

fn validate_periodo(payload: &CreateSolicitacaoPayload) -> Result<(), ValidationError> {
    if payload.data_fim < payload.data_inicio {
        let mut err = ValidationError::new("periodo");
        err.message = Some("A data final não pode ser anterior à data inicial.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisaoPayload {
    /// APROVADA ou REJEITADA
    pub status: StatusSolicitacao,
    #[validate(length(max = 1000, message = "Observação muito longa."))]
    pub observacao: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SolicitacaoFilters {
    pub status: Option<StatusSolicitacao>,
    pub user_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(inicio: &str, fim: &str) -> CreateSolicitacaoPayload {
        CreateSolicitacaoPayload {
            tipo: TipoSolicitacao::Ferias,
            data_inicio: inicio.parse().unwrap(),
            data_fim: fim.parse().unwrap(),
            motivo: "Férias de fim de ano".into(),
            anexo_url: None,
        }
    }

    #[test]
    fn end_before_start_is_invalid() {
        assert!(payload("2026-12-20", "2026-12-10").validate().is_err());
    }

    #[test]
    fn single_day_request_is_valid() {
        assert!(payload("2026-12-20", "2026-12-20").validate().is_ok());
    }

    #[test]
    fn tipo_uses_screaming_snake_case() {
        let tipo: TipoSolicitacao = serde_json::from_str("\"AJUSTE_PONTO\"").unwrap();
        assert_eq!(tipo, TipoSolicitacao::AjustePonto);
    }
}
