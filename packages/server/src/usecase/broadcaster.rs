//! Event Broadcaster
//!
//! クライアントから受信したイベントを処理し、適切な送信先（Audience）へ配信する。
//! 各イベントの処理は `join_participant`, `send_message`, `notify_typing`,
//! `disconnect_participant` に分かれている。
//!
//! ## 並行性
//!
//! `EventBroadcaster` は再入不可。Dispatcher タスクだけが `&mut` で保持し、
//! 1 つのイベントの処理（Registry の更新と全送信のキューイング）を完了してから次を処理する。

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{
    ConnectionId, Identity, InboundEvent, MessagePusher, OutboundEvent, PusherChannel,
    SessionRegistry, Timestamp,
};

/// 送信先の選択ルール（送信元の接続を基準に解決される）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// 送信元を含む全ての接続
    All,
    /// 送信元以外の全ての接続
    AllExceptSender,
    /// 送信元のみ
    SenderOnly,
    /// 指定した 1 接続
    Connection(ConnectionId),
}

impl Audience {
    /// 接続一覧から実際の送信先を決定する
    pub fn resolve(
        &self,
        sender: &ConnectionId,
        connections: Vec<ConnectionId>,
    ) -> Vec<ConnectionId> {
        match self {
            Audience::All => connections,
            Audience::AllExceptSender => connections
                .into_iter()
                .filter(|connection| connection != sender)
                .collect(),
            Audience::SenderOnly => vec![sender.clone()],
            Audience::Connection(target) => vec![target.clone()],
        }
    }
}

pub struct EventBroadcaster {
    pub(super) registry: SessionRegistry,
    pub(super) pusher: Box<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    pub(super) delivery_receipts: bool,
}

impl EventBroadcaster {
    pub fn new(pusher: Box<dyn MessagePusher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: SessionRegistry::new(),
            pusher,
            clock,
            delivery_receipts: true,
        }
    }

    /// 送信者への `message delivered` 通知の有無を設定
    pub fn with_delivery_receipts(mut self, enabled: bool) -> Self {
        self.delivery_receipts = enabled;
        self
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// トランスポート接続を登録する（join 前でも "全員" 宛ての送信対象になる）
    pub fn connect(&mut self, connection: ConnectionId, channel: PusherChannel) {
        tracing::debug!("Connection '{}' opened", connection);
        self.pusher.register_client(connection, channel);
    }

    /// 接続中の全 Identity
    pub fn participants(&self) -> Vec<Identity> {
        self.registry.list_identities()
    }

    /// 受信イベントを種類ごとの処理に振り分ける
    ///
    /// 切断指示済み（強制ログアウト）や切断済みの接続から遅れて届いたイベントは破棄する。
    pub fn handle(&mut self, connection: &ConnectionId, event: InboundEvent) {
        if !self.pusher.is_registered(connection) {
            tracing::debug!("Dropped event from terminated connection '{}'", connection);
            return;
        }

        match event {
            InboundEvent::Join { raw_name } => {
                let _ = self.join(connection, &raw_name);
            }
            InboundEvent::ChatMessage(draft) => {
                self.send_message(connection, draft);
            }
            InboundEvent::Typing { user } => {
                self.typing(connection, user.as_deref());
            }
            InboundEvent::StopTyping { user } => {
                self.stop_typing(connection, user.as_deref());
            }
        }
    }

    pub(super) fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// イベントを送信先に配信する（ベストエフォート。失敗はログに残して破棄する）
    pub(super) fn emit(&self, sender: &ConnectionId, audience: Audience, event: OutboundEvent) {
        let target = match audience {
            Audience::SenderOnly => sender.clone(),
            Audience::Connection(target) => target,
            audience => {
                let targets = audience.resolve(sender, self.pusher.connections());
                self.pusher.broadcast(&targets, &event);
                return;
            }
        };

        if let Err(e) = self.pusher.push_to(&target, &event) {
            tracing::warn!("Dropped '{}' for client '{}': {}", event.name(), target, e);
        }
    }
}
