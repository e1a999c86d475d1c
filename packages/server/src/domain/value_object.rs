//! Value Objects
//!
//! 不変で、値そのものによって等価性が判断されるドメインの型。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// 送信者を特定できないメッセージに使われる表示名
pub const UNKNOWN_IDENTITY: &str = "Unknown";

/// トランスポート層の 1 接続を表す不透明なハンドル
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// UUID v4 から新しい ConnectionId を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 表示名
///
/// 前後の空白を取り除いた、空でない文字列。
/// 同時に 1 つの接続だけが同じ Identity を保持できる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    /// 生の表示名から Identity を生成（trim してから検証）
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValueObjectError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyIdentity);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// 送信者不明のメッセージ用の Identity
    pub fn unknown() -> Self {
        Self(UNKNOWN_IDENTITY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// チャットメッセージの ID
///
/// クライアントが付与した ID はそのまま保持する（送信者側の楽観的表示との突き合わせに使われる）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValueObjectError::EmptyMessageId);
        }
        Ok(Self(value))
    }

    /// サーバー側で ID を生成する: `srv-<millis>-<8 hex>`
    pub fn generate(now: Timestamp) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("srv-{}-{}", now.value(), &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Unix epoch からのミリ秒
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
