use crate::auth::JwtVerifier;
use crate::error::{AppError, AppResult};
use crate::scoring::Tier;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::sync::RwLock;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Realtime channel a client can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Private pushes for one player
    User(Uuid),
    /// Leaderboard-wide announcements
    Leaderboard,
}

impl Channel {
    pub fn parse(s: &str) -> Result<Self, String> {
        if s == "leaderboard" {
            return Ok(Channel::Leaderboard);
        }
        match s.strip_prefix("user:") {
            Some(id) => Uuid::parse_str(id)
                .map(Channel::User)
                .map_err(|_| format!("Invalid user channel: {}", s)),
            None => Err(format!("Unknown channel: {}", s)),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::User(id) => write!(f, "user:{}", id),
            Channel::Leaderboard => write!(f, "leaderboard"),
        }
    }
}

/// WebSocket message types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "subscribe")]
    Subscribe {
        channel: String, // "user:{uuid}" or "leaderboard"
        /// Access token, required for `user:` channels when auth is enabled
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    #[serde(rename = "unsubscribe")]
    Unsubscribe { channel: String },
    #[serde(rename = "notification")]
    Notification {
        user_id: Uuid,
        notification_id: Uuid,
        kind: String,
        title: String,
        body: String,
    },
    #[serde(rename = "tier_promoted")]
    TierPromoted {
        user_id: Uuid,
        from: Tier,
        to: Tier,
        points: i64,
    },
    #[serde(rename = "duel_resolved")]
    DuelResolved {
        user_id: Uuid,
        match_id: Uuid,
        won: bool,
        mmr_delta: i32,
        mmr: i32,
    },
    #[serde(rename = "leaderboard_reset")]
    LeaderboardReset { profiles_reset: u64, timestamp: i64 },
    #[serde(rename = "error")]
    Error { message: String },
}

impl WsMessage {
    /// Channel a server push is delivered on; `None` for client messages
    pub fn channel(&self) -> Option<Channel> {
        match self {
            WsMessage::Notification { user_id, .. }
            | WsMessage::TierPromoted { user_id, .. }
            | WsMessage::DuelResolved { user_id, .. } => Some(Channel::User(*user_id)),
            WsMessage::LeaderboardReset { .. } => Some(Channel::Leaderboard),
            _ => None,
        }
    }
}

/// WebSocket server for realtime pushes
pub struct WebSocketServer {
    /// Broadcast sender; every connection filters by its own subscriptions
    tx: broadcast::Sender<WsMessage>,
    /// Active subscriptions: channel -> client IDs
    subscriptions: Arc<RwLock<HashMap<Channel, Vec<Uuid>>>>,
    /// Client subscriptions: client_id -> channels
    client_channels: Arc<RwLock<HashMap<Uuid, Vec<Channel>>>>,
    /// When set, `user:` subscriptions need a token for that user
    verifier: Option<Arc<JwtVerifier>>,
}

impl WebSocketServer {
    /// Create a new WebSocket server
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1000); // Buffer up to 1000 messages

        Self {
            tx,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            client_channels: Arc::new(RwLock::new(HashMap::new())),
            verifier: None,
        }
    }

    /// Require tokens for private channels
    pub fn with_verifier(mut self, verifier: Arc<JwtVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Push a server message to the subscribers of its channel
    pub async fn publish(&self, message: WsMessage) {
        let channel = match message.channel() {
            Some(channel) => channel,
            None => {
                warn!("Refusing to publish a client-only message");
                return;
            }
        };

        let count = self.subscriber_count(&channel).await;
        if count == 0 {
            debug!("No subscribers on {}, dropping push", channel);
            return;
        }

        debug!("Publishing to {} subscriber(s) on {}", count, channel);
        if let Err(e) = self.tx.send(message) {
            warn!("Failed to broadcast message: {}", e);
        }
    }

    pub async fn subscriber_count(&self, channel: &Channel) -> usize {
        let subscriptions = self.subscriptions.read().await;
        subscriptions.get(channel).map_or(0, |subscribers| subscribers.len())
    }

    /// Check whether a client may join `channel`
    pub fn authorize(&self, channel: &Channel, token: Option<&str>) -> AppResult<()> {
        let (verifier, user_id) = match (&self.verifier, channel) {
            (Some(verifier), Channel::User(user_id)) => (verifier, user_id),
            _ => return Ok(()),
        };

        let token = token.ok_or_else(|| {
            AppError::Unauthorized("Token required for user channels".to_string())
        })?;
        let caller = verifier.verify(token)?;
        if caller.id != *user_id {
            return Err(AppError::Forbidden(
                "Cannot subscribe to another user's channel".to_string(),
            ));
        }
        Ok(())
    }

    /// Subscribe a client to a channel
    pub async fn subscribe(&self, client_id: Uuid, channel: Channel) {
        let mut subscriptions = self.subscriptions.write().await;
        let mut client_channels = self.client_channels.write().await;

        let subscribers = subscriptions.entry(channel).or_insert_with(Vec::new);
        if !subscribers.contains(&client_id) {
            subscribers.push(client_id);
        }

        let channels = client_channels.entry(client_id).or_insert_with(Vec::new);
        if !channels.contains(&channel) {
            channels.push(channel);
        }

        info!("Client {} subscribed to {}", client_id, channel);
    }

    /// Unsubscribe a client from a channel
    pub async fn unsubscribe(&self, client_id: Uuid, channel: &Channel) {
        let mut subscriptions = self.subscriptions.write().await;
        let mut client_channels = self.client_channels.write().await;

        if let Some(subscribers) = subscriptions.get_mut(channel) {
            subscribers.retain(|&id| id != client_id);
            if subscribers.is_empty() {
                subscriptions.remove(channel);
            }
        }

        if let Some(channels) = client_channels.get_mut(&client_id) {
            channels.retain(|c| c != channel);
        }

        info!("Client {} unsubscribed from {}", client_id, channel);
    }

    /// Drop every subscription of a disconnected client
    pub async fn remove_client(&self, client_id: Uuid) {
        let channels = self.get_client_channels(client_id).await;
        for channel in &channels {
            self.unsubscribe(client_id, channel).await;
        }
        self.client_channels.write().await.remove(&client_id);
    }

    /// Get all channels a client is subscribed to
    pub async fn get_client_channels(&self, client_id: Uuid) -> Vec<Channel> {
        let client_channels = self.client_channels.read().await;
        client_channels.get(&client_id).cloned().unwrap_or_default()
    }

    async fn is_client_subscribed(&self, client_id: Uuid, channel: &Channel) -> bool {
        let subscriptions = self.subscriptions.read().await;
        subscriptions
            .get(channel)
            .map_or(false, |subscribers| subscribers.contains(&client_id))
    }

    /// Answer one client frame; returns the reply to send back
    async fn handle_client_message(&self, client_id: Uuid, text: &str) -> serde_json::Value {
        let message = match serde_json::from_str::<WsMessage>(text) {
            Ok(message) => message,
            Err(_) => {
                warn!("Failed to parse message from client {}", client_id);
                return serde_json::json!({"type": "error", "message": "Invalid message format"});
            }
        };

        match message {
            WsMessage::Subscribe { channel, token } => {
                let parsed = match Channel::parse(&channel) {
                    Ok(parsed) => parsed,
                    Err(e) => return serde_json::json!({"type": "error", "message": e}),
                };
                if let Err(e) = self.authorize(&parsed, token.as_deref()) {
                    warn!("Client {} denied {}: {}", client_id, channel, e);
                    return serde_json::json!({"type": "error", "message": e.to_string()});
                }
                self.subscribe(client_id, parsed).await;
                serde_json::json!({"type": "subscribed", "channel": channel})
            }
            WsMessage::Unsubscribe { channel } => {
                if let Ok(parsed) = Channel::parse(&channel) {
                    self.unsubscribe(client_id, &parsed).await;
                }
                serde_json::json!({"type": "unsubscribed", "channel": channel})
            }
            _ => {
                warn!("Unexpected message type from client {}", client_id);
                serde_json::json!({
                    "type": "error",
                    "message": "Only subscribe and unsubscribe are accepted"
                })
            }
        }
    }

    /// Serve one WebSocket connection until the client goes away.
    ///
    /// Client requests and broadcast pushes are handled in one loop, so the
    /// broadcast receiver and the subscriptions are released together when
    /// either side closes.
    pub async fn handle_connection(&self, stream: tokio::net::TcpStream) -> AppResult<()> {
        let ws_stream = accept_async(stream)
            .await
            .map_err(|e| AppError::Message(format!("WebSocket handshake failed: {}", e)))?;

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let mut rx = self.tx.subscribe();
        let client_id = Uuid::new_v4();

        info!("New WebSocket connection: {}", client_id);

        let welcome = serde_json::json!({
            "type": "connected",
            "client_id": client_id.to_string(),
        });
        if let Err(e) = ws_sender.send(Message::Text(welcome.to_string())).await {
            warn!("Failed to send welcome message: {}", e);
        }

        loop {
            tokio::select! {
                incoming = ws_receiver.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let reply = self.handle_client_message(client_id, &text).await;
                        if let Err(e) = ws_sender.send(Message::Text(reply.to_string())).await {
                            debug!("Client {} gone: {}", client_id, e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket connection closed: {}", client_id);
                        break;
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                },
                outgoing = rx.recv() => {
                    let msg = match outgoing {
                        Ok(msg) => msg,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("Client {} lagged, skipped {} message(s)", client_id, skipped);
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    };

                    let should_send = match msg.channel() {
                        Some(channel) => self.is_client_subscribed(client_id, &channel).await,
                        None => false,
                    };
                    if !should_send {
                        continue;
                    }

                    let json = match serde_json::to_string(&msg) {
                        Ok(json) => json,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = ws_sender.send(Message::Text(json)).await {
                        debug!("Client {} gone: {}", client_id, e);
                        break;
                    }
                }
            }
        }

        drop(rx);
        self.remove_client(client_id).await;
        Ok(())
    }

    /// Accept connections until the listener fails
    pub async fn serve(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New WebSocket connection from {}", addr);
                    let ws = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = ws.handle_connection(stream).await {
                            error!("WebSocket connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("WebSocket accept error: {}", e);
                }
            }
        }
    }
}

impl Clone for WebSocketServer {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            subscriptions: Arc::clone(&self.subscriptions),
            client_channels: Arc::clone(&self.client_channels),
            verifier: self.verifier.clone(),
        }
    }
}

impl Default for WebSocketServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use crate::config::JwtConfig;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn verifier() -> Arc<JwtVerifier> {
        Arc::new(JwtVerifier::new(&JwtConfig {
            secret: "ws-secret".to_string(),
            audience: "authenticated".to_string(),
        }))
    }

    fn token_for(user_id: Uuid) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: chrono::Utc::now().timestamp() + 600,
            aud: Some("authenticated".to_string()),
            email: None,
            role: None,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"ws-secret")).unwrap()
    }

    #[test]
    fn test_channel_parsing() {
        let id = Uuid::new_v4();
        assert_eq!(Channel::parse(&format!("user:{}", id)).unwrap(), Channel::User(id));
        assert_eq!(Channel::parse("leaderboard").unwrap(), Channel::Leaderboard);
        assert!(Channel::parse("event:1").is_err());
        assert!(Channel::parse("user:not-a-uuid").is_err());
        assert_eq!(Channel::User(id).to_string(), format!("user:{}", id));
    }

    #[test]
    fn test_message_routing() {
        let id = Uuid::new_v4();
        let push = WsMessage::TierPromoted {
            user_id: id,
            from: Tier::Bronze,
            to: Tier::Silver,
            points: 3000,
        };
        assert_eq!(push.channel(), Some(Channel::User(id)));

        let reset = WsMessage::LeaderboardReset {
            profiles_reset: 3,
            timestamp: 0,
        };
        assert_eq!(reset.channel(), Some(Channel::Leaderboard));

        let sub = WsMessage::Subscribe {
            channel: "leaderboard".to_string(),
            token: None,
        };
        assert_eq!(sub.channel(), None);
    }

    #[test]
    fn test_subscribe_message_wire_format() {
        let msg: WsMessage =
            serde_json::from_str(r#"{"type":"subscribe","channel":"leaderboard"}"#).unwrap();
        assert_eq!(
            msg,
            WsMessage::Subscribe {
                channel: "leaderboard".to_string(),
                token: None
            }
        );

        let json = serde_json::to_value(WsMessage::LeaderboardReset {
            profiles_reset: 2,
            timestamp: 10,
        })
        .unwrap();
        assert_eq!(json["type"], "leaderboard_reset");
    }

    #[tokio::test]
    async fn test_subscribe_and_unsubscribe() {
        let server = WebSocketServer::new();
        let client = Uuid::new_v4();
        let channel = Channel::User(Uuid::new_v4());

        server.subscribe(client, channel).await;
        server.subscribe(client, channel).await;
        assert_eq!(server.subscriber_count(&channel).await, 1);
        assert!(server.is_client_subscribed(client, &channel).await);

        server.remove_client(client).await;
        assert_eq!(server.subscriber_count(&channel).await, 0);
        assert!(server.get_client_channels(client).await.is_empty());
    }

    #[tokio::test]
    async fn test_publish_reaches_broadcast_only_with_subscribers() {
        let server = WebSocketServer::new();
        let mut rx = server.tx.subscribe();
        let reset = WsMessage::LeaderboardReset {
            profiles_reset: 1,
            timestamp: 0,
        };

        server.publish(reset.clone()).await;
        assert!(rx.try_recv().is_err());

        server.subscribe(Uuid::new_v4(), Channel::Leaderboard).await;
        server.publish(reset.clone()).await;
        assert_eq!(rx.try_recv().unwrap(), reset);
    }

    #[test]
    fn test_authorize_user_channels() {
        let user = Uuid::new_v4();
        let server = WebSocketServer::new().with_verifier(verifier());

        assert!(server.authorize(&Channel::Leaderboard, None).is_ok());
        assert!(server.authorize(&Channel::User(user), Some(&token_for(user))).is_ok());
        assert!(matches!(
            server.authorize(&Channel::User(user), None),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            server.authorize(&Channel::User(user), Some(&token_for(Uuid::new_v4()))),
            Err(AppError::Forbidden(_))
        ));

        // Without a verifier every channel is open
        assert!(WebSocketServer::new().authorize(&Channel::User(user), None).is_ok());
    }

    #[tokio::test]
    async fn test_client_message_handling() {
        let server = WebSocketServer::new();
        let client = Uuid::new_v4();

        let reply = server
            .handle_client_message(client, r#"{"type":"subscribe","channel":"leaderboard"}"#)
            .await;
        assert_eq!(reply["type"], "subscribed");
        assert_eq!(server.subscriber_count(&Channel::Leaderboard).await, 1);

        let reply = server.handle_client_message(client, "not json").await;
        assert_eq!(reply["type"], "error");

        let reply = server
            .handle_client_message(client, r#"{"type":"subscribe","channel":"event:1"}"#)
            .await;
        assert_eq!(reply["type"], "error");
    }

    #[tokio::test]
    async fn test_disconnect_releases_connection_resources() {
        use std::time::Duration;
        use tokio_tungstenite::connect_async;

        let server = Arc::new(WebSocketServer::new());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(server.clone().serve(listener));

        let (mut client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        let welcome = client.next().await.unwrap().unwrap();
        assert!(welcome.to_text().unwrap().contains("connected"));

        client
            .send(Message::Text(r#"{"type":"subscribe","channel":"leaderboard"}"#.to_string()))
            .await
            .unwrap();
        let ack = client.next().await.unwrap().unwrap();
        assert!(ack.to_text().unwrap().contains("subscribed"));
        assert_eq!(server.tx.receiver_count(), 1);
        assert_eq!(server.subscriber_count(&Channel::Leaderboard).await, 1);

        client.close(None).await.unwrap();

        for _ in 0..100 {
            let released = server.tx.receiver_count() == 0
                && server.subscriber_count(&Channel::Leaderboard).await == 0;
            if released {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(server.tx.receiver_count(), 0);
        assert_eq!(server.subscriber_count(&Channel::Leaderboard).await, 0);

        // Publishing after the disconnect reaches nobody
        server
            .publish(WsMessage::LeaderboardReset {
                profiles_reset: 3,
                timestamp: 0,
            })
            .await;
        assert_eq!(server.tx.receiver_count(), 0);
    }
}
