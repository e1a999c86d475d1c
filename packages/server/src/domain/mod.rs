//! Domain layer
//!
//! プレゼンス管理とメッセージ配信の中核となるドメインモデルを定義します。
//!
//! - `value_object`: ConnectionId, Identity, MessageId, Timestamp
//! - `entity`: ChatMessage, InboundEvent, OutboundEvent
//! - `session_registry`: 接続と表示名の双方向マッピング
//! - `message_pusher`: メッセージ通知の抽象化（依存性の逆転）

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod session_registry;
pub mod value_object;

pub use entity::{ChatMessage, ChatMessageDraft, InboundEvent, LogoutReason, OutboundEvent};
pub use error::{MessagePushError, RegistryError, ValueObjectError};
pub use message_pusher::{MessagePusher, PushFrame, PusherChannel};
pub use session_registry::{Registration, SessionRegistry};
pub use value_object::{ConnectionId, Identity, MessageId, Timestamp};
