// src/services/chat_service.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ChatRepository, UserRepository},
    models::chat::{
        ChatContact, ChatEvent, ChatMessage, Conversation, SendMessagePayload, SentMessage,
        UnreadSummary,
    },
    services::chat_hub::ChatHub,
};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

/// Limita o tamanho da página pedido pelo cliente a [1, 100].
pub fn page_size(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

#[derive(Clone)]
pub struct ChatService {
    repo: ChatRepository,
    user_repo: UserRepository,
    hub: ChatHub,
}

impl ChatService {
    pub fn new(repo: ChatRepository, user_repo: UserRepository, hub: ChatHub) -> Self {
        Self { repo, user_repo, hub }
    }

    /// Persiste a mensagem e a entrega nos canais do destinatário e do remetente.
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        payload: SendMessagePayload,
    ) -> Result<SentMessage, AppError> {
        if payload.receiver_id == sender_id {
            return Err(AppError::BadRequest("Não é possível enviar mensagem para si mesmo.".into()));
        }

        let content = payload.content.trim();
        if content.is_empty() && payload.attachment_url.is_none() {
            return Err(AppError::BadRequest("A mensagem não pode ser vazia.".into()));
        }

        let receiver = self.user_repo
            .find_by_id(payload.receiver_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        if !receiver.is_active() {
            return Err(AppError::BadRequest("O destinatário está inativo.".into()));
        }

        let message = self.repo
            .create_message(sender_id, receiver.id, content, payload.attachment_url.as_deref())
            .await?;

        let event = ChatEvent::MessageNew {
            message: message.clone(),
            client_id: payload.client_id.clone(),
        };
        let delivered = self.hub.publish_to(receiver.id, event.clone()).await;
        // Outras abas do remetente também precisam da mensagem confirmada
        self.hub.publish_to(sender_id, event).await;

        tracing::debug!("💬 Mensagem {} enviada (entregue em tempo real: {})", message.id, delivered);

        Ok(SentMessage { message, client_id: payload.client_id })
    }

    /// Histórico paginado, devolvido do mais antigo para o mais novo.
    pub async fn conversation_messages(
        &self,
        user_id: Uuid,
        partner_id: Uuid,
        before: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let mut messages = self.repo
            .list_between(user_id, partner_id, before, page_size(limit))
            .await?;
        messages.reverse();
        Ok(messages)
    }

    pub async fn conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>, AppError> {
        let mut conversations = self.repo.list_conversations(user_id).await?;
        let online = self.hub.online_users().await;
        for conversation in &mut conversations {
            conversation.online = online.binary_search(&conversation.partner_id).is_ok();
        }
        Ok(conversations)
    }

    pub async fn contacts(&self, user_id: Uuid) -> Result<Vec<ChatContact>, AppError> {
        let mut contacts = self.user_repo.list_contacts(user_id).await?;
        let online = self.hub.online_users().await;
        for contact in &mut contacts {
            contact.online = online.binary_search(&contact.id).is_ok();
        }
        Ok(contacts)
    }

    pub async fn unread(&self, user_id: Uuid) -> Result<UnreadSummary, AppError> {
        let conversations = self.repo.unread_counts(user_id).await?;
        let total = conversations.iter().map(|c| c.count).sum();
        Ok(UnreadSummary { total, conversations })
    }

    /// Zera o não lido da conversa e avisa o interlocutor.
    pub async fn mark_read(&self, user_id: Uuid, partner_id: Uuid) -> Result<u64, AppError> {
        let updated = self.repo.mark_read(user_id, partner_id).await?;
        if updated > 0 {
            self.hub
                .publish_to(partner_id, ChatEvent::MessagesRead { reader_id: user_id, count: updated })
                .await;
        }
        Ok(updated)
    }

    pub async fn delete_message(&self, user_id: Uuid, message_id: Uuid) -> Result<(), AppError> {
        let Some(message) = self.repo.delete_own(message_id, user_id).await? else {
            if self.repo.exists(message_id).await? {
                return Err(AppError::Forbidden("Só o autor pode apagar a mensagem.".into()));
            }
            return Err(AppError::NotFound("Mensagem não encontrada.".into()));
        };

        let event = ChatEvent::MessageDeleted { message_id, sender_id: user_id };
        self.hub.publish_to(message.receiver_id, event.clone()).await;
        self.hub.publish_to(user_id, event).await;
        Ok(())
    }

    /// Repassa o aviso de "digitando" sem tocar no banco.
    pub async fn typing(&self, from: Uuid, to: Uuid) {
        if from != to {
            self.hub.publish_to(to, ChatEvent::Typing { from }).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(page_size(None), 50);
        assert_eq!(page_size(Some(0)), 1);
        assert_eq!(page_size(Some(-5)), 1);
        assert_eq!(page_size(Some(30)), 30);
        assert_eq!(page_size(Some(1000)), 100);
    }
}
