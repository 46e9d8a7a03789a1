// src/db/solicitacao_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::solicitacoes::{
        CreateSolicitacaoPayload, Solicitacao, SolicitacaoFilters, StatusSolicitacao,
    },
};

const SOLICITACAO_SELECT: &str = r#"
    SELECT s.id, s.user_id, u.name AS user_name, s.tipo, s.status, s.data_inicio, s.data_fim,
           s.motivo, s.anexo_url, s.avaliado_por, s.avaliado_em, s.observacao_avaliacao,
           s.created_at, s.updated_at
    FROM solicitacoes s
    JOIN users u ON u.id = s.user_id
"#;

#[derive(Clone)]
pub struct SolicitacaoRepository {
    pool: PgPool,
}

impl SolicitacaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, payload: &CreateSolicitacaoPayload) -> Result<Solicitacao, AppError> {
        let solicitacao = sqlx::query_as::<_, Solicitacao>(
            r#"
            WITH nova AS (
                INSERT INTO solicitacoes (user_id, tipo, data_inicio, data_fim, motivo, anexo_url)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT s.id, s.user_id, u.name AS user_name, s.tipo, s.status, s.data_inicio, s.data_fim,
                   s.motivo, s.anexo_url, s.avaliado_por, s.avaliado_em, s.observacao_avaliacao,
                   s.created_at, s.updated_at
            FROM nova s
            JOIN users u ON u.id = s.user_id
            "#,
        )
        .bind(user_id)
        .bind(payload.tipo)
        .bind(payload.data_inicio)
        .bind(payload.data_fim)
        .bind(payload.motivo.trim())
        .bind(payload.anexo_url.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(solicitacao)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Solicitacao>, AppError> {
        let sql = format!("{SOLICITACAO_SELECT} WHERE s.id = $1");
        let solicitacao = sqlx::query_as::<_, Solicitacao>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(solicitacao)
    }

    pub async fn list(&self, filters: &SolicitacaoFilters) -> Result<Vec<Solicitacao>, AppError> {
        let sql = format!(
            r#"{SOLICITACAO_SELECT}
            WHERE ($1::status_solicitacao IS NULL OR s.status = $1)
              AND ($2::uuid IS NULL OR s.user_id = $2)
            ORDER BY s.created_at DESC
            "#
        );
        let solicitacoes = sqlx::query_as::<_, Solicitacao>(&sql)
            .bind(filters.status)
            .bind(filters.user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(solicitacoes)
    }

    /// Muda o status só se a solicitação ainda estiver PENDENTE.
    /// Retorna `None` quando nada foi alterado.
    pub async fn transition_from_pending(
        &self,
        id: Uuid,
        status: StatusSolicitacao,
        avaliado_por: Option<Uuid>,
        observacao: Option<&str>,
    ) -> Result<Option<Uuid>, AppError> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE solicitacoes SET
                status               = $2,
                avaliado_por         = $3,
                avaliado_em          = CASE WHEN $3::uuid IS NULL THEN NULL ELSE NOW() END,
                observacao_avaliacao = $4,
                updated_at           = NOW()
            WHERE id = $1 AND status = 'PENDENTE'
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(avaliado_por)
        .bind(observacao)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}
