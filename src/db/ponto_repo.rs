// src/db/ponto_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::ponto::{PontoRegistro, TipoPonto},
};

#[derive(Clone)]
pub struct PontoRepository {
    pool: PgPool,
}

impl PontoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        tipo: TipoPonto,
        registrado_em: DateTime<Utc>,
        observacao: Option<&str>,
        registrado_por: Uuid,
    ) -> Result<PontoRegistro, AppError> {
        let registro = sqlx::query_as::<_, PontoRegistro>(
            r#"
            INSERT INTO ponto_registros (user_id, tipo, registrado_em, observacao, registrado_por)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(tipo)
        .bind(registrado_em)
        .bind(observacao)
        .bind(registrado_por)
        .fetch_one(&self.pool)
        .await?;

        Ok(registro)
    }

    /// Batidas de `user_id` no intervalo semiaberto [start, end), em ordem cronológica.
    pub async fn list_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PontoRegistro>, AppError> {
        let registros = sqlx::query_as::<_, PontoRegistro>(
            r#"
            SELECT * FROM ponto_registros
            WHERE user_id = $1 AND registrado_em >= $2 AND registrado_em < $3
            ORDER BY registrado_em, created_at
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(registros)
    }

    pub async fn last_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<PontoRegistro>, AppError> {
        let registro = sqlx::query_as::<_, PontoRegistro>(
            r#"
            SELECT * FROM ponto_registros
            WHERE user_id = $1 AND registrado_em >= $2 AND registrado_em < $3
            ORDER BY registrado_em DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registro)
    }

    pub async fn update(
        &self,
        id: Uuid,
        tipo: Option<TipoPonto>,
        registrado_em: Option<DateTime<Utc>>,
        observacao: Option<&str>,
        registrado_por: Uuid,
    ) -> Result<Option<PontoRegistro>, AppError> {
        let registro = sqlx::query_as::<_, PontoRegistro>(
            r#"
            UPDATE ponto_registros SET
                tipo           = COALESCE($2, tipo),
                registrado_em  = COALESCE($3, registrado_em),
                observacao     = COALESCE($4, observacao),
                registrado_por = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tipo)
        .bind(registrado_em)
        .bind(observacao)
        .bind(registrado_por)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registro)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM ponto_registros WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
