//! MessagePusher trait 定義
//!
//! クライアントへのメッセージ送信（通知）のインターフェース。
//! 具体的な実装（WebSocket）は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 設計ノート
//!
//! メソッドはすべて同期的です。送信先はクライアントごとの unbounded channel であり、
//! 送信がブロックすることはありません。Dispatcher は 1 つのイベントの処理中に
//! `.await` を挟まずに全ての送信をキューに積み終えます。

use tokio::sync::mpsc;

use super::{
    entity::{LogoutReason, OutboundEvent},
    error::MessagePushError,
    value_object::ConnectionId,
};

/// 接続ごとの送信キューに積まれるフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushFrame {
    /// シリアライズ済みのイベント
    Text(String),
    /// 接続を閉じる
    Close(LogoutReason),
}

/// クライアントへのメッセージ送信用チャンネル
pub type PusherChannel = mpsc::UnboundedSender<PushFrame>;

#[cfg_attr(test, mockall::automock)]
pub trait MessagePusher: Send {
    /// クライアントの送信チャンネルを登録（以後 "全員" 宛ての送信対象になる）
    fn register_client(&mut self, connection: ConnectionId, channel: PusherChannel);

    /// クライアントを登録解除。登録されていた場合は `true`
    fn unregister_client(&mut self, connection: &ConnectionId) -> bool;

    /// 登録中の全クライアント
    fn connections(&self) -> Vec<ConnectionId>;

    /// クライアントが登録中か（切断指示済みの接続は `false`）
    fn is_registered(&self, connection: &ConnectionId) -> bool;

    /// 特定のクライアントに送信
    fn push_to(
        &self,
        connection: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントに送信（一部の送信失敗は許容する）
    fn broadcast(&self, targets: &[ConnectionId], event: &OutboundEvent);

    /// クライアントに切断を指示し、登録解除する
    fn close(&mut self, connection: &ConnectionId, reason: LogoutReason);
}
