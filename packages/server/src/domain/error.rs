//! Domain errors.

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// 表示名が空（trim 後）
    #[error("Identity must not be empty")]
    EmptyIdentity,

    /// メッセージ ID が空
    #[error("Message id must not be empty")]
    EmptyMessageId,
}

/// Session Registry のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// trim 後に空になる表示名での join
    #[error("Invalid identity: {0:?}")]
    InvalidIdentity(String),
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 送信先のクライアントが存在しない
    #[error("Client '{0}' not found")]
    ClientNotFound(String),

    /// 送信に失敗した（受信側がすでに切断済みなど）
    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
