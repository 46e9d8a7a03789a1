// src/models/chat.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    #[schema(example = "Bom dia! A reunião foi remarcada para as 14h.")]
    pub content: String,
    pub attachment_url: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// Uma conversa = um interlocutor + a última mensagem trocada
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub partner_id: Uuid,
    pub partner_name: String,
    pub partner_avatar_url: Option<String>,
    pub last_message: String,
    pub last_sender_id: Uuid,
    pub last_message_at: DateTime<Utc>,
    pub unread_count: i64,
    #[sqlx(skip)]
    pub online: bool,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatContact {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role_name: Option<String>,
    #[sqlx(skip)]
    pub online: bool,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub sender_id: Uuid,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadSummary {
    pub total: i64,
    pub conversations: Vec<UnreadCount>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PresenceSnapshot {
    pub online: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadReceipt {
    pub updated: u64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub receiver_id: Uuid,

    #[validate(length(max = 4000, message = "A mensagem deve ter no máximo 4000 caracteres."))]
    #[serde(default)]
    pub content: String,

    pub attachment_url: Option<String>,

    /// ID provisório do cliente, devolvido para substituir a mensagem otimista
    #[validate(length(max = 64, message = "clientId muito longo."))]
    #[schema(example = "tmp-1718049051123")]
    pub client_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub client_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessagesQuery {
    /// Só mensagens anteriores a este instante (paginação)
    pub before: Option<DateTime<Utc>>,
    /// Padrão 50, máximo 100
    pub limit: Option<i64>,
}

/// Eventos empurrados pelo WebSocket, marcados pelo campo `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ChatEvent {
    #[serde(rename = "presence.sync")]
    PresenceSync { online: Vec<Uuid> },
    #[serde(rename = "presence.enter")]
    PresenceEnter { user_id: Uuid },
    #[serde(rename = "presence.leave")]
    PresenceLeave { user_id: Uuid },
    #[serde(rename = "message.new")]
    MessageNew {
        message: ChatMessage,
        client_id: Option<String>,
    },
    #[serde(rename = "message.read")]
    MessagesRead { reader_id: Uuid, count: u64 },
    #[serde(rename = "message.deleted")]
    MessageDeleted { message_id: Uuid, sender_id: Uuid },
    #[serde(rename = "typing")]
    Typing { from: Uuid },
    #[serde(rename = "pong")]
    Pong,
}

/// O que o cliente pode mandar pelo socket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientEvent {
    Ping,
    Typing { to: Uuid },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_are_tagged_by_type() {
        let user_id = Uuid::nil();
        let value = serde_json::to_value(ChatEvent::PresenceEnter { user_id }).unwrap();
        assert_eq!(value, json!({ "type": "presence.enter", "userId": user_id }));

        let value = serde_json::to_value(ChatEvent::Pong).unwrap();
        assert_eq!(value, json!({ "type": "pong" }));
    }

    #[test]
    fn parses_client_events() {
        let to = Uuid::new_v4();
        let event: ClientEvent = serde_json::from_value(json!({ "type": "typing", "to": to })).unwrap();
        assert_eq!(event, ClientEvent::Typing { to });

        let event: ClientEvent = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(event, ClientEvent::Ping);

        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"shutdown"}"#).is_err());
    }
}
