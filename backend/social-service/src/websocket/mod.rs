//! Realtime chat relay
//!
//! Each connection walks `Connecting -> Authenticated -> Active -> Disconnected`.
//! Only connections whose [`AuthContext`] carries a logged-in user are registered
//! with the relay; anonymous connections stay inert until they disconnect.
//! Messages are fanned out fire-and-forget over unbounded channels, so a slow
//! recipient never blocks the sender.

use crate::services::markup::strip_markup;
use actix_middleware::{AuthContext, SessionUser};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use tracing::{debug, info};
use uuid::Uuid;

pub mod message_types;

pub use message_types::{WsInboundEvent, WsOutboundEvent};

/// Unique identifier for a relay connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Authenticated,
    Active,
    Disconnected,
}

/// Registry of active connections
#[derive(Default, Clone)]
pub struct ChatRelay {
    inner: Arc<RwLock<HashMap<ConnectionId, UnboundedSender<WsOutboundEvent>>>>,
}

impl ChatRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a connection for the given session
    ///
    /// Returns the outbound receiver only for authenticated sessions; it already
    /// holds the welcome event.
    pub async fn connect(
        &self,
        auth: &AuthContext,
    ) -> (ChatConnection, Option<UnboundedReceiver<WsOutboundEvent>>) {
        let mut connection = ChatConnection {
            id: ConnectionId::new(),
            user: None,
            state: ConnectionState::Connecting,
            relay: self.clone(),
        };

        let Some(user) = auth.user().cloned() else {
            debug!(connection = ?connection.id, "anonymous chat connection stays inert");
            return (connection, None);
        };
        connection.user = Some(user.clone());
        connection.state = ConnectionState::Authenticated;

        let (tx, rx) = unbounded_channel();
        // Receiver is still held locally, so this send cannot fail
        let _ = tx.send(WsOutboundEvent::Welcome {
            username: user.username.clone(),
            avatar: user.avatar.clone(),
        });

        let mut guard = self.inner.write().await;
        guard.insert(connection.id, tx);
        connection.state = ConnectionState::Active;

        info!(
            connection = ?connection.id,
            username = %user.username,
            active = guard.len(),
            "chat connection active"
        );

        (connection, Some(rx))
    }

    /// Send `event` to every active connection except `origin`
    ///
    /// Dead senders are dropped from the registry.
    pub async fn broadcast_except(&self, origin: ConnectionId, event: WsOutboundEvent) {
        let mut guard = self.inner.write().await;
        let before = guard.len();

        guard.retain(|id, sender| *id == origin || sender.send(event.clone()).is_ok());

        let after = guard.len();
        if before != after {
            debug!(
                cleaned = before - after,
                active = after,
                "dead chat subscribers cleaned up"
            );
        }
    }

    async fn remove(&self, id: ConnectionId) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    pub async fn active_count(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// One client's view of the relay
#[derive(Clone)]
pub struct ChatConnection {
    id: ConnectionId,
    user: Option<SessionUser>,
    state: ConnectionState,
    relay: ChatRelay,
}

impl ChatConnection {
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Handle an inbound event; a no-op unless the connection is active
    pub async fn receive(&self, event: WsInboundEvent) {
        let (ConnectionState::Active, Some(user)) = (self.state, self.user.as_ref()) else {
            return;
        };

        match event {
            WsInboundEvent::ChatMessage { message } => {
                let outbound = WsOutboundEvent::ChatMessage {
                    message: strip_markup(&message),
                    username: user.username.clone(),
                    avatar: user.avatar.clone(),
                };
                self.relay.broadcast_except(self.id, outbound).await;
            }
        }
    }

    pub async fn disconnect(&mut self) {
        if self.relay.remove(self.id).await {
            info!(connection = ?self.id, "chat connection closed");
        }
        self.state = ConnectionState::Disconnected;
    }
}
