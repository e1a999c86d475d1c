//! Conversion logic between DTOs and domain entities.

use crate::domain::{ChatMessageDraft, Identity, InboundEvent, OutboundEvent};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::ClientEvent> for InboundEvent {
    fn from(event: dto::ClientEvent) -> Self {
        match event {
            dto::ClientEvent::Join(payload) => InboundEvent::Join {
                raw_name: payload.user,
            },
            dto::ClientEvent::ChatMessage(payload) => InboundEvent::ChatMessage(payload.into()),
            dto::ClientEvent::Typing(payload) => InboundEvent::Typing { user: payload.user },
            dto::ClientEvent::StopTyping(payload) => {
                InboundEvent::StopTyping { user: payload.user }
            }
        }
    }
}

impl From<dto::ChatMessagePayload> for ChatMessageDraft {
    fn from(payload: dto::ChatMessagePayload) -> Self {
        Self {
            id: payload.id,
            user: payload.user,
            text: payload.text,
            time: payload.time,
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

fn user_payload(identity: Identity) -> dto::UserPayload {
    dto::UserPayload {
        user: identity.into_string(),
    }
}

impl From<OutboundEvent> for dto::ServerEvent {
    fn from(event: OutboundEvent) -> Self {
        match event {
            OutboundEvent::Message(message) => Self::Message(dto::MessagePayload {
                id: message.id.into_string(),
                user: message.sender.into_string(),
                text: message.text,
                time: message.timestamp.value(),
            }),
            OutboundEvent::MessageDelivered { id } => {
                Self::MessageDelivered(dto::MessageDeliveredPayload {
                    id: id.into_string(),
                })
            }
            OutboundEvent::UserJoined(identity) => Self::UserJoined(user_payload(identity)),
            OutboundEvent::UserLeft(identity) => Self::UserLeft(user_payload(identity)),
            OutboundEvent::UserList(identities) => Self::UserList(
                identities.into_iter().map(Identity::into_string).collect(),
            ),
            OutboundEvent::Typing(identity) => Self::Typing(user_payload(identity)),
            OutboundEvent::StopTyping(identity) => Self::StopTyping(user_payload(identity)),
            OutboundEvent::JoinError { message } => {
                Self::JoinError(dto::JoinErrorPayload { message })
            }
            OutboundEvent::ForceLogout { reason } => Self::ForceLogout(dto::ForceLogoutPayload {
                reason: reason.as_str().to_string(),
            }),
        }
    }
}
