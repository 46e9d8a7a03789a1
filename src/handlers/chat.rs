// src/handlers/chat.rs

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::chat::{
        ChatContact, ChatEvent, ChatMessage, ClientEvent, Conversation, MessagesQuery,
        PresenceSnapshot, ReadReceipt, SendMessagePayload, SentMessage, UnreadSummary,
    },
    services::chat_hub::ChatSubscription,
};

// ---
// REST
// ---

#[utoipa::path(
    post,
    path = "/api/chat/messages",
    tag = "Chat",
    request_body = SendMessagePayload,
    responses(
        (status = 201, description = "Mensagem gravada e publicada", body = SentMessage),
        (status = 400, description = "Mensagem vazia, longa demais ou para si mesmo"),
        (status = 404, description = "Destinatário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let sent = app_state.chat_service.send_message(user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(sent)))
}

#[utoipa::path(
    delete,
    path = "/api/chat/messages/{id}",
    tag = "Chat",
    params(("id" = Uuid, Path, description = "ID da mensagem")),
    responses(
        (status = 204, description = "Mensagem apagada"),
        (status = 403, description = "Mensagem de outro usuário"),
        (status = 404, description = "Mensagem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_message(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.chat_service.delete_message(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/chat/conversations",
    tag = "Chat",
    responses(
        (status = 200, description = "Uma entrada por interlocutor, mais recente primeiro", body = Vec<Conversation>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_conversations(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Conversation>>, AppError> {
    let conversations = app_state.chat_service.conversations(user.id).await?;
    Ok(Json(conversations))
}

#[utoipa::path(
    get,
    path = "/api/chat/conversations/{partner_id}/messages",
    tag = "Chat",
    params(
        ("partner_id" = Uuid, Path, description = "ID do interlocutor"),
        MessagesQuery
    ),
    responses(
        (status = 200, description = "Página de mensagens, da mais antiga para a mais nova", body = Vec<ChatMessage>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(partner_id): Path<Uuid>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let messages = app_state.chat_service
        .conversation_messages(user.id, partner_id, query.before, query.limit)
        .await?;
    Ok(Json(messages))
}

#[utoipa::path(
    post,
    path = "/api/chat/conversations/{partner_id}/read",
    tag = "Chat",
    params(("partner_id" = Uuid, Path, description = "ID do interlocutor")),
    responses(
        (status = 200, description = "Mensagens marcadas como lidas", body = ReadReceipt)
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(partner_id): Path<Uuid>,
) -> Result<Json<ReadReceipt>, AppError> {
    let updated = app_state.chat_service.mark_read(user.id, partner_id).await?;
    Ok(Json(ReadReceipt { updated }))
}

#[utoipa::path(
    get,
    path = "/api/chat/unread",
    tag = "Chat",
    responses(
        (status = 200, description = "Não lidas por remetente e total", body = UnreadSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn unread(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<UnreadSummary>, AppError> {
    let summary = app_state.chat_service.unread(user.id).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/chat/contacts",
    tag = "Chat",
    responses(
        (status = 200, description = "Funcionários ativos com quem é possível conversar", body = Vec<ChatContact>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contacts(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<ChatContact>>, AppError> {
    let contacts = app_state.chat_service.contacts(user.id).await?;
    Ok(Json(contacts))
}

#[utoipa::path(
    get,
    path = "/api/chat/presence",
    tag = "Chat",
    responses(
        (status = 200, description = "Usuários conectados agora", body = PresenceSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn presence(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Json<PresenceSnapshot> {
    Json(PresenceSnapshot {
        online: app_state.chat_hub.online_users().await,
    })
}

// ---
// WebSocket
// ---

#[utoipa::path(
    get,
    path = "/api/chat/ws",
    tag = "Chat",
    responses(
        (status = 101, description = "Conexão WebSocket de eventos do chat"),
        (status = 401, description = "Sem sessão válida")
    ),
    security(("api_jwt" = []))
)]
pub async fn chat_ws(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_socket(app_state, user.id, socket))
}

type Outgoing = SplitSink<WebSocket, Message>;

async fn run_socket(app_state: AppState, user_id: Uuid, socket: WebSocket) {
    let ChatSubscription { mut personal, mut presence, online } =
        app_state.chat_hub.connect(user_id).await;
    let (mut outgoing, mut incoming) = socket.split();

    if send_event(&mut outgoing, &ChatEvent::PresenceSync { online }).await {
        loop {
            let keep_going = tokio::select! {
                received = personal.recv() => forward(&mut outgoing, received, user_id).await,
                received = presence.recv() => forward(&mut outgoing, received, user_id).await,
                frame = incoming.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_event(&app_state, &mut outgoing, user_id, text.as_str()).await
                    }
                    Some(Ok(Message::Close(_))) | None => false,
                    Some(Ok(_)) => true,
                    Some(Err(e)) => {
                        tracing::debug!("Erro no socket de {}: {}", user_id, e);
                        false
                    }
                },
            };

            if !keep_going {
                break;
            }
        }
    }

    app_state.chat_hub.disconnect(user_id).await;
}

/// Repassa um evento do hub para o socket. `false` encerra a conexão.
async fn forward(outgoing: &mut Outgoing, received: Result<ChatEvent, RecvError>, user_id: Uuid) -> bool {
    match received {
        Ok(event) => send_event(outgoing, &event).await,
        Err(RecvError::Lagged(skipped)) => {
            tracing::warn!("Socket de {} atrasado; {} evento(s) descartado(s)", user_id, skipped);
            true
        }
        Err(RecvError::Closed) => false,
    }
}

async fn handle_client_event(app_state: &AppState, outgoing: &mut Outgoing, user_id: Uuid, text: &str) -> bool {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(ClientEvent::Ping) => send_event(outgoing, &ChatEvent::Pong).await,
        Ok(ClientEvent::Typing { to }) => {
            app_state.chat_service.typing(user_id, to).await;
            true
        }
        Err(e) => {
            // Mensagem desconhecida não derruba a conexão
            tracing::debug!("Evento inválido de {}: {}", user_id, e);
            true
        }
    }
}

async fn send_event(outgoing: &mut Outgoing, event: &ChatEvent) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Falha ao serializar evento do chat: {}", e);
            return true;
        }
    };
    outgoing.send(Message::Text(json.into())).await.is_ok()
}
