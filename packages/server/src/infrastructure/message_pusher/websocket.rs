//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの送信チャンネル（`PusherChannel`）を管理
//! - ドメインのイベントを JSON にシリアライズして送信（push_to, broadcast）
//! - 強制ログアウト時の切断指示（close）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された sender を受け取り、メッセージ送信に使用します。
//! Dispatcher タスクが唯一の所有者なので、マップはロックで保護しません。

use std::collections::HashMap;

use crate::{
    domain::{
        ConnectionId, LogoutReason, MessagePushError, MessagePusher, OutboundEvent, PushFrame,
        PusherChannel,
    },
    infrastructure::dto::websocket::ServerEvent,
};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信チャンネル
    clients: HashMap<ConnectionId, PusherChannel>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    fn encode(event: &OutboundEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerEvent::from(event.clone()))
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }

    fn send_frame(
        &self,
        connection: &ConnectionId,
        frame: PushFrame,
    ) -> Result<(), MessagePushError> {
        let sender = self
            .clients
            .get(connection)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection.to_string()))?;
        sender
            .send(frame)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }
}

impl MessagePusher for WebSocketMessagePusher {
    fn register_client(&mut self, connection: ConnectionId, channel: PusherChannel) {
        tracing::debug!("Client '{}' registered to MessagePusher", connection);
        self.clients.insert(connection, channel);
    }

    fn unregister_client(&mut self, connection: &ConnectionId) -> bool {
        let removed = self.clients.remove(connection).is_some();
        if removed {
            tracing::debug!("Client '{}' unregistered from MessagePusher", connection);
        }
        removed
    }

    fn connections(&self) -> Vec<ConnectionId> {
        self.clients.keys().cloned().collect()
    }

    fn is_registered(&self, connection: &ConnectionId) -> bool {
        self.clients.contains_key(connection)
    }

    fn push_to(
        &self,
        connection: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError> {
        let content = Self::encode(event)?;
        self.send_frame(connection, PushFrame::Text(content))?;
        tracing::debug!("Pushed '{}' to client '{}'", event.name(), connection);
        Ok(())
    }

    fn broadcast(&self, targets: &[ConnectionId], event: &OutboundEvent) {
        let content = match Self::encode(event) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to encode '{}': {}", event.name(), e);
                return;
            }
        };

        for target in targets {
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = self.send_frame(target, PushFrame::Text(content.clone())) {
                tracing::warn!(
                    "Dropped '{}' for client '{}': {}",
                    event.name(),
                    target,
                    e
                );
            }
        }
        tracing::debug!("Broadcasted '{}' to {} client(s)", event.name(), targets.len());
    }

    fn close(&mut self, connection: &ConnectionId, reason: LogoutReason) {
        if let Err(e) = self.send_frame(connection, PushFrame::Close(reason)) {
            tracing::warn!("Failed to close client '{}': {}", connection, e);
        }
        self.clients.remove(connection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Identity;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定のクライアントへの送信
    // - broadcast: 複数クライアントへの送信（部分失敗の許容）
    // - close: 切断指示と登録解除
    // ========================================

    fn joined(name: &str) -> OutboundEvent {
        OutboundEvent::UserJoined(Identity::new(name).unwrap())
    }

    fn text(frame: Option<PushFrame>) -> serde_json::Value {
        match frame {
            Some(PushFrame::Text(content)) => serde_json::from_str(&content).unwrap(),
            other => panic!("expected text frame, got {:?}", other),
        }
    }

    #[test]
    fn test_push_to_success() {
        // テスト項目: 特定のクライアントにイベントを送信できる
        // given (前提条件):
        let mut pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let alice = ConnectionId::new("alice-conn");
        pusher.register_client(alice.clone(), tx);

        // when (操作):
        let result = pusher.push_to(&alice, &joined("bob"));

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            text(rx.try_recv().ok()),
            serde_json::json!({"event": "user joined", "data": {"user": "bob"}})
        );
    }

    #[test]
    fn test_push_to_client_not_found() {
        // テスト項目: 存在しないクライアントへの送信はエラーを返す
        let pusher = WebSocketMessagePusher::new();

        let result = pusher.push_to(&ConnectionId::new("ghost"), &joined("bob"));

        assert!(matches!(result, Err(MessagePushError::ClientNotFound(_))));
    }

    #[test]
    fn test_push_to_closed_receiver() {
        // テスト項目: 受信側が破棄されている場合は PushFailed になる
        let mut pusher = WebSocketMessagePusher::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let alice = ConnectionId::new("alice-conn");
        pusher.register_client(alice.clone(), tx);
        drop(rx);

        let result = pusher.push_to(&alice, &joined("bob"));

        assert!(matches!(result, Err(MessagePushError::PushFailed(_))));
    }

    #[test]
    fn test_broadcast_partial_failure() {
        // テスト項目: 一部の送信先が存在しなくても他の送信先には届く
        // given (前提条件):
        let mut pusher = WebSocketMessagePusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        let alice = ConnectionId::new("alice-conn");
        let bob = ConnectionId::new("bob-conn");
        pusher.register_client(alice.clone(), tx1);
        pusher.register_client(bob.clone(), tx2);
        drop(rx2);

        // when (操作):
        let targets = vec![ConnectionId::new("ghost"), bob, alice];
        pusher.broadcast(&targets, &joined("carol"));

        // then (期待する結果):
        assert_eq!(
            text(rx1.try_recv().ok()),
            serde_json::json!({"event": "user joined", "data": {"user": "carol"}})
        );
    }

    #[test]
    fn test_close_sends_close_frame_and_unregisters() {
        // テスト項目: close で切断指示が送られ、以後の送信対象から外れる
        // given (前提条件):
        let mut pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let alice = ConnectionId::new("alice-conn");
        pusher.register_client(alice.clone(), tx);

        // when (操作):
        pusher.close(&alice, LogoutReason::DuplicateLogin);

        // then (期待する結果):
        assert_eq!(
            rx.try_recv().ok(),
            Some(PushFrame::Close(LogoutReason::DuplicateLogin))
        );
        assert!(pusher.connections().is_empty());
        assert!(!pusher.is_registered(&alice));
        assert!(!pusher.unregister_client(&alice));
    }
}
