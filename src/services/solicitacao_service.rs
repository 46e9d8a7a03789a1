// src/services/solicitacao_service.rs

use uuid::Uuid;

use crate::{
    common::{db_utils::blank_to_none, error::AppError},
    db::SolicitacaoRepository,
    models::solicitacoes::{
        CreateSolicitacaoPayload, DecisaoPayload, Solicitacao, SolicitacaoFilters,
        StatusSolicitacao,
    },
};

/// Só APROVADA e REJEITADA são decisões de um avaliador.
pub fn is_decisao(status: StatusSolicitacao) -> bool {
    matches!(status, StatusSolicitacao::Aprovada | StatusSolicitacao::Rejeitada)
}

#[derive(Clone)]
pub struct SolicitacaoService {
    repo: SolicitacaoRepository,
}

impl SolicitacaoService {
    pub fn new(repo: SolicitacaoRepository) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        payload: &CreateSolicitacaoPayload,
    ) -> Result<Solicitacao, AppError> {
        let solicitacao = self.repo.create(user_id, payload).await?;
        tracing::info!("📝 Solicitação {} aberta por {}", solicitacao.id, user_id);
        Ok(solicitacao)
    }

    pub async fn list_mine(
        &self,
        user_id: Uuid,
        status: Option<StatusSolicitacao>,
    ) -> Result<Vec<Solicitacao>, AppError> {
        self.repo
            .list(&SolicitacaoFilters { status, user_id: Some(user_id) })
            .await
    }

    pub async fn list(&self, filters: &SolicitacaoFilters) -> Result<Vec<Solicitacao>, AppError> {
        self.repo.list(filters).await
    }

    /// O dono sempre enxerga a própria solicitação; os demais precisam ser avaliadores.
    pub async fn get(&self, viewer_id: Uuid, can_review: bool, id: Uuid) -> Result<Solicitacao, AppError> {
        let solicitacao = self.find(id).await?;
        if solicitacao.user_id != viewer_id && !can_review {
            return Err(AppError::Forbidden("Você não pode ver esta solicitação.".into()));
        }
        Ok(solicitacao)
    }

    pub async fn decidir(
        &self,
        avaliador_id: Uuid,
        id: Uuid,
        payload: &DecisaoPayload,
    ) -> Result<Solicitacao, AppError> {
        if !is_decisao(payload.status) {
            return Err(AppError::BadRequest("A decisão deve ser APROVADA ou REJEITADA.".into()));
        }

        let observacao = blank_to_none(payload.observacao.as_deref());
        let updated = self.repo
            .transition_from_pending(id, payload.status, Some(avaliador_id), observacao.as_deref())
            .await?;

        if updated.is_none() {
            // Distingue "não existe" de "já foi decidida"
            self.find(id).await?;
            return Err(AppError::Conflict("A solicitação já foi avaliada ou cancelada.".into()));
        }

        tracing::info!("✅ Solicitação {} marcada como {:?} por {}", id, payload.status, avaliador_id);
        self.find(id).await
    }

    /// O próprio funcionário desiste de uma solicitação ainda pendente.
    pub async fn cancelar(&self, user_id: Uuid, id: Uuid) -> Result<Solicitacao, AppError> {
        let solicitacao = self.find(id).await?;
        if solicitacao.user_id != user_id {
            return Err(AppError::Forbidden("Só o autor pode cancelar a solicitação.".into()));
        }

        self.repo
            .transition_from_pending(id, StatusSolicitacao::Cancelada, None, None)
            .await?
            .ok_or_else(|| AppError::Conflict("Só solicitações pendentes podem ser canceladas.".into()))?;

        self.find(id).await
    }

    async fn find(&self, id: Uuid) -> Result<Solicitacao, AppError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Solicitação não encontrada.".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_approve_and_reject_are_decisions() {
        assert!(is_decisao(StatusSolicitacao::Aprovada));
        assert!(is_decisao(StatusSolicitacao::Rejeitada));
        assert!(!is_decisao(StatusSolicitacao::Pendente));
        assert!(!is_decisao(StatusSolicitacao::Cancelada));
    }
}
