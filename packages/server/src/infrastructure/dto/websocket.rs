//! WebSocket message DTOs.
//!
//! Every text frame carries one envelope: `{"event": <name>, "data": <payload>}`.
//! Inbound payloads are decoded leniently: a missing or mistyped field falls back
//! to its default instead of rejecting the whole event.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Inbound event names
pub mod event {
    pub const JOIN: &str = "join";
    pub const CHAT_MESSAGE: &str = "chat message";
    pub const TYPING: &str = "typing";
    pub const STOP_TYPING: &str = "stop typing";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unknown event '{0}'")]
    UnknownEvent(String),
}

/// Raw inbound envelope
#[derive(Debug, Deserialize)]
pub struct ClientEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Decoded inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Join(JoinPayload),
    ChatMessage(ChatMessagePayload),
    Typing(TypingPayload),
    StopTyping(TypingPayload),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinPayload {
    pub user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChatMessagePayload {
    #[serde(deserialize_with = "lenient_opt_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub user: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(deserialize_with = "lenient_opt_millis")]
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TypingPayload {
    #[serde(deserialize_with = "lenient_opt_string")]
    pub user: Option<String>,
}

/// Decode one inbound text frame.
///
/// A frame that is not a JSON envelope is treated as a plain-text chat message.
pub fn decode_client_event(text: &str) -> Result<ClientEvent, DecodeError> {
    let envelope = match serde_json::from_str::<ClientEnvelope>(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Failed to parse frame as event envelope: {}", e);
            return Ok(ClientEvent::ChatMessage(ChatMessagePayload {
                text: text.to_string(),
                ..Default::default()
            }));
        }
    };

    let event = match envelope.event.as_str() {
        event::JOIN => ClientEvent::Join(JoinPayload::from_value(envelope.data)),
        event::CHAT_MESSAGE => ClientEvent::ChatMessage(payload_or_default(envelope.data)),
        event::TYPING => ClientEvent::Typing(payload_or_default(envelope.data)),
        event::STOP_TYPING => ClientEvent::StopTyping(payload_or_default(envelope.data)),
        _ => return Err(DecodeError::UnknownEvent(envelope.event)),
    };
    Ok(event)
}

impl JoinPayload {
    /// `{"user": "..."}` or a bare string
    fn from_value(data: Value) -> Self {
        let user = match data {
            Value::String(user) => user,
            Value::Object(mut map) => match map.remove("user") {
                Some(value) => value_to_string(value),
                None => String::new(),
            },
            _ => String::new(),
        };
        Self { user }
    }
}

fn payload_or_default<T>(data: Value) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    serde_json::from_value(data).unwrap_or_else(|e| {
        tracing::warn!("Malformed payload, using defaults: {}", e);
        T::default()
    })
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(Value::deserialize(deserializer)?))
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = value_to_string(Value::deserialize(deserializer)?);
    Ok((!value.is_empty()).then_some(value))
}

/// 正の整数のみを時刻として扱う。0・負数・数値以外は `None`（サーバー時刻で補われる）
fn lenient_opt_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    };
    Ok(millis.filter(|millis| *millis > 0))
}

// ========================================
// Outbound
// ========================================

/// Outbound event envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "message")]
    Message(MessagePayload),
    #[serde(rename = "message delivered")]
    MessageDelivered(MessageDeliveredPayload),
    #[serde(rename = "user joined")]
    UserJoined(UserPayload),
    #[serde(rename = "user left")]
    UserLeft(UserPayload),
    #[serde(rename = "user list")]
    UserList(Vec<String>),
    #[serde(rename = "typing")]
    Typing(UserPayload),
    #[serde(rename = "stop typing")]
    StopTyping(UserPayload),
    #[serde(rename = "join error")]
    JoinError(JoinErrorPayload),
    #[serde(rename = "force logout")]
    ForceLogout(ForceLogoutPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub id: String,
    pub user: String,
    pub text: String,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeliveredPayload {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceLogoutPayload {
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_join_object() {
        // テスト項目: {"user": ...} 形式の join をデコードできる
        // given (前提条件):
        let frame = r#"{"event":"join","data":{"user":"Zoya"}}"#;

        // when (操作):
        let result = decode_client_event(frame);

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(ClientEvent::Join(JoinPayload {
                user: "Zoya".to_string()
            }))
        );
    }

    #[test]
    fn test_decode_join_bare_string() {
        // テスト項目: 文字列だけの join ペイロードも受け付ける
        let result = decode_client_event(r#"{"event":"join","data":"Zoya"}"#);

        assert_eq!(
            result,
            Ok(ClientEvent::Join(JoinPayload {
                user: "Zoya".to_string()
            }))
        );
    }

    #[test]
    fn test_decode_join_without_data_defaults_to_empty_user() {
        // テスト項目: ペイロードのない join は空の名前として扱われる
        let result = decode_client_event(r#"{"event":"join"}"#);

        assert_eq!(result, Ok(ClientEvent::Join(JoinPayload::default())));
    }

    #[test]
    fn test_decode_chat_message_full() {
        // テスト項目: 全フィールドを持つチャットメッセージをデコードできる
        // given (前提条件):
        let frame = r#"{"event":"chat message","data":{"id":"tmp-1","user":"alice","text":"hi","time":1700000000000}}"#;

        // when (操作):
        let result = decode_client_event(frame);

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(ClientEvent::ChatMessage(ChatMessagePayload {
                id: Some("tmp-1".to_string()),
                user: Some("alice".to_string()),
                text: "hi".to_string(),
                time: Some(1_700_000_000_000),
            }))
        );
    }

    #[test]
    fn test_decode_chat_message_degrades_malformed_fields() {
        // テスト項目: 型の異なるフィールドはデフォルト値または文字列に変換される
        // given (前提条件):
        let frame = r#"{"event":"chat message","data":{"id":"","text":42,"time":"soon"}}"#;

        // when (操作):
        let result = decode_client_event(frame);

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(ClientEvent::ChatMessage(ChatMessagePayload {
                id: None,
                user: None,
                text: "42".to_string(),
                time: None,
            }))
        );
    }

    #[test]
    fn test_decode_chat_message_ignores_non_positive_time() {
        // テスト項目: 0 や負数の時刻は指定なしとして扱われる
        let zero = decode_client_event(r#"{"event":"chat message","data":{"time":0}}"#);
        let negative = decode_client_event(r#"{"event":"chat message","data":{"time":-5}}"#);

        assert_eq!(
            zero,
            Ok(ClientEvent::ChatMessage(ChatMessagePayload::default()))
        );
        assert_eq!(
            negative,
            Ok(ClientEvent::ChatMessage(ChatMessagePayload::default()))
        );
    }

    #[test]
    fn test_decode_chat_message_with_non_object_payload() {
        // テスト項目: オブジェクトでないペイロードは空のメッセージになる
        let result = decode_client_event(r#"{"event":"chat message","data":7}"#);

        assert_eq!(
            result,
            Ok(ClientEvent::ChatMessage(ChatMessagePayload::default()))
        );
    }

    #[test]
    fn test_decode_plain_text_as_chat_message() {
        // テスト項目: JSON でないフレームはテキストメッセージとして扱われる
        let result = decode_client_event("hello there");

        assert_eq!(
            result,
            Ok(ClientEvent::ChatMessage(ChatMessagePayload {
                text: "hello there".to_string(),
                ..Default::default()
            }))
        );
    }

    #[test]
    fn test_decode_typing_events() {
        // テスト項目: typing / stop typing をデコードできる
        let typing = decode_client_event(r#"{"event":"typing","data":{"user":"alice"}}"#);
        let stop = decode_client_event(r#"{"event":"stop typing","data":{}}"#);

        assert_eq!(
            typing,
            Ok(ClientEvent::Typing(TypingPayload {
                user: Some("alice".to_string())
            }))
        );
        assert_eq!(stop, Ok(ClientEvent::StopTyping(TypingPayload::default())));
    }

    #[test]
    fn test_decode_unknown_event() {
        // テスト項目: 未知のイベント名はエラーになる
        let result = decode_client_event(r#"{"event":"dance","data":{}}"#);

        assert_eq!(result, Err(DecodeError::UnknownEvent("dance".to_string())));
    }

    #[test]
    fn test_server_event_envelope_shape() {
        // テスト項目: 送出イベントが {"event", "data"} 形式でシリアライズされる
        // given (前提条件):
        let event = ServerEvent::UserList(vec!["alice".to_string(), "bob".to_string()]);

        // when (操作):
        let json = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({"event": "user list", "data": ["alice", "bob"]})
        );
    }

    #[test]
    fn test_force_logout_envelope_shape() {
        // テスト項目: force logout のワイヤー形式
        let event = ServerEvent::ForceLogout(ForceLogoutPayload {
            reason: "duplicate_login".to_string(),
        });

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"event": "force logout", "data": {"reason": "duplicate_login"}})
        );
    }
}
