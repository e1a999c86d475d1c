//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EventBroadcaster::send_message() メソッド
//! - メッセージの正規化（ID・時刻の付与、送信者の解決）と全員への配信
//!
//! ### なぜこのテストが必要か
//! - 送信者は自分のメッセージを ID で突き合わせて楽観的表示を確定させる
//! - 不正なペイロードでも処理が中断しないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：クライアントが ID を付与したメッセージ
//! - エッジケース：ID・時刻なし、join していない接続からの送信

use crate::domain::{
    ChatMessage, ChatMessageDraft, ConnectionId, Identity, MessageId, OutboundEvent, Timestamp,
};

use super::broadcaster::{Audience, EventBroadcaster};

impl EventBroadcaster {
    /// メッセージ送信を実行
    ///
    /// 送信者は Registry の Identity を優先し、なければペイロードの `user`、
    /// それもなければ "Unknown" とする（認証ではない）。
    ///
    /// # Returns
    ///
    /// 正規化され、全員（送信者を含む）に配信された ChatMessage
    pub fn send_message(
        &mut self,
        connection: &ConnectionId,
        draft: ChatMessageDraft,
    ) -> ChatMessage {
        let now = self.now();
        let message = self.normalize(connection, draft, now);

        tracing::debug!(
            "Broadcasting message '{}' from '{}'",
            message.id.as_str(),
            message.sender
        );
        self.emit(
            connection,
            Audience::All,
            OutboundEvent::Message(message.clone()),
        );

        if self.delivery_receipts {
            self.emit(
                connection,
                Audience::SenderOnly,
                OutboundEvent::MessageDelivered {
                    id: message.id.clone(),
                },
            );
        }

        message
    }

    fn normalize(
        &self,
        connection: &ConnectionId,
        draft: ChatMessageDraft,
        now: Timestamp,
    ) -> ChatMessage {
        let sender = match self.registry.identity_of(connection) {
            Some(identity) => identity.clone(),
            None => draft
                .user
                .and_then(|user| Identity::new(user).ok())
                .unwrap_or_else(Identity::unknown),
        };
        let id = draft
            .id
            .and_then(|id| MessageId::new(id).ok())
            .unwrap_or_else(|| MessageId::generate(now));
        let timestamp = draft
            .time
            .filter(|time| *time > 0)
            .map(Timestamp::new)
            .unwrap_or(now);

        ChatMessage {
            id,
            sender,
            text: draft.text,
            timestamp,
        }
    }
}
