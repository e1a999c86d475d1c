//! UseCase layer
//!
//! クライアントイベントの処理（join, メッセージ送信, 入力中通知, 切断）と、
//! それらを逐次実行する Dispatcher。

pub mod broadcaster;
pub mod disconnect_participant;
pub mod dispatcher;
pub mod error;
pub mod join_participant;
pub mod notify_typing;
pub mod send_message;

#[cfg(test)]
pub(crate) mod test_support;

pub use broadcaster::{Audience, EventBroadcaster};
pub use dispatcher::{Command, Dispatcher, DispatcherHandle};
pub use error::DispatchError;
pub use join_participant::INVALID_USERNAME_MESSAGE;
