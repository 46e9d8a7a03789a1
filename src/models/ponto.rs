// src/models/ponto.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_ponto", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoPonto {
    Entrada,
    Saida,
}

// Uma batida de ponto
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PontoRegistro {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tipo: TipoPonto,
    pub registrado_em: DateTime<Utc>,
    #[schema(example = "Esqueci de bater na volta do almoço")]
    pub observacao: Option<String>,
    /// Quem lançou a batida (o próprio funcionário ou um gestor)
    pub registrado_por: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Um turno: par ENTRADA/SAIDA. Metade ausente = turno incompleto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Turno {
    pub entrada: Option<DateTime<Utc>>,
    pub saida: Option<DateTime<Utc>>,
    #[schema(example = 10800)]
    pub duracao_segundos: i64,
    pub incompleto: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoDia {
    pub data: NaiveDate,
    pub turnos: Vec<Turno>,
    #[schema(example = 25200)]
    pub total_segundos: i64,
    #[schema(example = "07:00")]
    pub total_formatado: String,
    pub incompleto: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoPonto {
    pub user_id: Uuid,
    pub de: NaiveDate,
    pub ate: NaiveDate,
    pub dias: Vec<ResumoDia>,
    pub total_segundos: i64,
    #[schema(example = "151:30")]
    pub total_formatado: String,
    pub incompleto: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PontoListResponse {
    pub registros: Vec<PontoRegistro>,
    pub resumo: ResumoPonto,
}

// Batida do próprio funcionário. Sem `tipo`, alterna a partir da última do dia.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarPontoPayload {
    pub tipo: Option<TipoPonto>,
    #[validate(length(max = 500, message = "Observação muito longa."))]
    pub observacao: Option<String>,
}

// Lançamento manual feito por um gestor
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LancarPontoPayload {
    pub user_id: Uuid,
    pub tipo: TipoPonto,
    pub registrado_em: DateTime<Utc>,
    #[validate(length(max = 500, message = "Observação muito longa."))]
    pub observacao: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AjustarPontoPayload {
    pub tipo: Option<TipoPonto>,
    pub registrado_em: Option<DateTime<Utc>>,
    #[validate(length(max = 500, message = "Observação muito longa."))]
    pub observacao: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PontoPeriodo {
    /// Funcionário (só para quem tem `ponto:read_all`)
    pub user_id: Option<Uuid>,
    /// Primeiro dia (inclusivo). Padrão: início do mês corrente.
    pub from: Option<NaiveDate>,
    /// Último dia (inclusivo). Padrão: hoje.
    pub to: Option<NaiveDate>,
}
