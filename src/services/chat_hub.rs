// src/services/chat_hub.rs

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::models::chat::ChatEvent;

/// Capacidade de cada canal; quem ficar para trás perde os eventos mais antigos.
const CHANNEL_CAPACITY: usize = 64;

/// Assinaturas entregues a uma nova conexão.
pub struct ChatSubscription {
    pub personal: broadcast::Receiver<ChatEvent>,
    pub presence: broadcast::Receiver<ChatEvent>,
    /// Usuários online no momento da conexão (inclui o próprio).
    pub online: Vec<Uuid>,
}

#[derive(Default)]
struct HubState {
    /// Canal pessoal de cada usuário com ao menos uma conexão
    channels: HashMap<Uuid, broadcast::Sender<ChatEvent>>,
    /// Quantidade de conexões abertas por usuário (várias abas contam)
    connections: HashMap<Uuid, usize>,
}

/// Pub/sub em memória do chat: um canal por usuário e um canal de presença.
#[derive(Clone)]
pub struct ChatHub {
    state: Arc<RwLock<HubState>>,
    presence: broadcast::Sender<ChatEvent>,
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatHub {
    pub fn new() -> Self {
        let (presence, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(HubState::default())),
            presence,
        }
    }

    /// Registra uma conexão. A primeira conexão do usuário publica `presence.enter`.
    pub async fn connect(&self, user_id: Uuid) -> ChatSubscription {
        let presence = self.presence.subscribe();

        let mut state = self.state.write().await;
        let personal = state
            .channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();

        let count = state.connections.entry(user_id).or_insert(0);
        *count += 1;
        let first_connection = *count == 1;

        let mut online: Vec<Uuid> = state.connections.keys().copied().collect();
        online.sort();
        drop(state);

        if first_connection {
            tracing::debug!("🟢 {} entrou no chat", user_id);
            let _ = self.presence.send(ChatEvent::PresenceEnter { user_id });
        }

        ChatSubscription { personal, presence, online }
    }

    /// Encerra uma conexão. A última conexão do usuário publica `presence.leave`.
    pub async fn disconnect(&self, user_id: Uuid) {
        let mut state = self.state.write().await;

        let Some(count) = state.connections.get_mut(&user_id) else {
            return;
        };
        *count = count.saturating_sub(1);
        if *count > 0 {
            return;
        }

        state.connections.remove(&user_id);
        state.channels.remove(&user_id);
        drop(state);

        tracing::debug!("⚪ {} saiu do chat", user_id);
        let _ = self.presence.send(ChatEvent::PresenceLeave { user_id });
    }

    /// Entrega um evento no canal pessoal do usuário. Retorna se alguém recebeu.
    pub async fn publish_to(&self, user_id: Uuid, event: ChatEvent) -> bool {
        let state = self.state.read().await;
        match state.channels.get(&user_id) {
            // `send` só falha quando não há receptores
            Some(channel) => channel.send(event).is_ok(),
            None => false,
        }
    }

    pub async fn online_users(&self) -> Vec<Uuid> {
        let state = self.state.read().await;
        let mut online: Vec<Uuid> = state.connections.keys().copied().collect();
        online.sort();
        online
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn first_connection_announces_presence_once() {
        let hub = ChatHub::new();
        let observer = Uuid::new_v4();
        let mut presence = hub.connect(observer).await.presence;
        assert_eq!(presence.try_recv().unwrap(), ChatEvent::PresenceEnter { user_id: observer });

        let user = Uuid::new_v4();
        let first = hub.connect(user).await;
        let _second_tab = hub.connect(user).await;

        assert_eq!(presence.try_recv().unwrap(), ChatEvent::PresenceEnter { user_id: user });
        assert!(matches!(presence.try_recv(), Err(TryRecvError::Empty)));
        assert!(first.online.contains(&user));
    }

    #[tokio::test]
    async fn leave_only_after_last_connection_closes() {
        let hub = ChatHub::new();
        let observer = Uuid::new_v4();
        let mut presence = hub.connect(observer).await.presence;
        assert_eq!(presence.try_recv().unwrap(), ChatEvent::PresenceEnter { user_id: observer });

        let user = Uuid::new_v4();
        let _a = hub.connect(user).await;
        let _b = hub.connect(user).await;
        assert_eq!(presence.try_recv().unwrap(), ChatEvent::PresenceEnter { user_id: user });

        hub.disconnect(user).await;
        assert!(hub.online_users().await.contains(&user));
        assert!(matches!(presence.try_recv(), Err(TryRecvError::Empty)));

        hub.disconnect(user).await;
        assert!(!hub.online_users().await.contains(&user));
        assert_eq!(presence.try_recv().unwrap(), ChatEvent::PresenceLeave { user_id: user });
    }

    #[tokio::test]
    async fn snapshot_lists_connected_users() {
        let hub = ChatHub::new();
        let ana = Uuid::new_v4();
        let bruno = Uuid::new_v4();

        hub.connect(ana).await;
        let sub = hub.connect(bruno).await;

        let mut expected = vec![ana, bruno];
        expected.sort();
        assert_eq!(sub.online, expected);
        assert_eq!(hub.online_users().await, expected);

        hub.disconnect(ana).await;
        assert_eq!(hub.online_users().await, vec![bruno]);
    }

    #[tokio::test]
    async fn events_reach_only_the_addressed_user() {
        let hub = ChatHub::new();
        let ana = Uuid::new_v4();
        let bruno = Uuid::new_v4();
        let mut ana_sub = hub.connect(ana).await;
        let mut bruno_sub = hub.connect(bruno).await;

        let delivered = hub.publish_to(bruno, ChatEvent::Typing { from: ana }).await;

        assert!(delivered);
        assert_eq!(bruno_sub.personal.try_recv().unwrap(), ChatEvent::Typing { from: ana });
        assert!(matches!(ana_sub.personal.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn publishing_to_offline_user_is_a_no_op() {
        let hub = ChatHub::new();
        assert!(!hub.publish_to(Uuid::new_v4(), ChatEvent::Pong).await);
    }

    #[tokio::test]
    async fn disconnect_of_unknown_user_is_ignored() {
        let hub = ChatHub::new();
        let mut presence = hub.connect(Uuid::new_v4()).await.presence;
        let _ = presence.try_recv();

        hub.disconnect(Uuid::new_v4()).await;
        assert!(matches!(presence.try_recv(), Err(TryRecvError::Empty)));
    }
}
