//! Entities
//!
//! チャットメッセージと、クライアントへ送出されるイベントのドメインモデル。

use super::value_object::{Identity, MessageId, Timestamp};

/// 正規化済みのチャットメッセージ（永続化されない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: Identity,
    pub text: String,
    pub timestamp: Timestamp,
}

/// 強制ログアウトの理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// 同じ表示名で別の接続が join した
    DuplicateLogin,
}

impl LogoutReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogoutReason::DuplicateLogin => "duplicate_login",
        }
    }
}

/// クライアントへ送出されるイベント
///
/// ワイヤー形式への変換は Infrastructure 層（DTO）が担当する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    Message(ChatMessage),
    MessageDelivered { id: MessageId },
    UserJoined(Identity),
    UserLeft(Identity),
    UserList(Vec<Identity>),
    Typing(Identity),
    StopTyping(Identity),
    JoinError { message: String },
    ForceLogout { reason: LogoutReason },
}

impl OutboundEvent {
    /// ログ出力用のイベント名（ワイヤー上のイベント名と同じ）
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::Message(_) => "message",
            OutboundEvent::MessageDelivered { .. } => "message delivered",
            OutboundEvent::UserJoined(_) => "user joined",
            OutboundEvent::UserLeft(_) => "user left",
            OutboundEvent::UserList(_) => "user list",
            OutboundEvent::Typing(_) => "typing",
            OutboundEvent::StopTyping(_) => "stop typing",
            OutboundEvent::JoinError { .. } => "join error",
            OutboundEvent::ForceLogout { .. } => "force logout",
        }
    }
}

/// クライアントから送られてきた未正規化のチャットメッセージ
///
/// 欠けているフィールドは Broadcaster が補完する（ID・時刻の付与、送信者の解決）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessageDraft {
    pub id: Option<String>,
    pub user: Option<String>,
    pub text: String,
    pub time: Option<i64>,
}

/// クライアントから受信したイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Join { raw_name: String },
    ChatMessage(ChatMessageDraft),
    Typing { user: Option<String> },
    StopTyping { user: Option<String> },
}
