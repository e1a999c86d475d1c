//! UseCase: 入力中状態の通知
//!
//! サーバー側では入力中状態を保持しない。重複排除やレート制限も行わず、
//! 受け取った順にそのまま送信元以外へ中継する（間引きはクライアントの責務）。

use crate::domain::{ConnectionId, Identity, OutboundEvent};

use super::broadcaster::{Audience, EventBroadcaster};

impl EventBroadcaster {
    /// 入力開始を送信元以外に通知する。通知した Identity を返す
    pub fn typing(&mut self, connection: &ConnectionId, user: Option<&str>) -> Option<Identity> {
        let identity = self.typing_identity(connection, user)?;
        self.emit(
            connection,
            Audience::AllExceptSender,
            OutboundEvent::Typing(identity.clone()),
        );
        Some(identity)
    }

    /// 入力終了を送信元以外に通知する。通知した Identity を返す
    pub fn stop_typing(
        &mut self,
        connection: &ConnectionId,
        user: Option<&str>,
    ) -> Option<Identity> {
        let identity = self.typing_identity(connection, user)?;
        self.emit(
            connection,
            Audience::AllExceptSender,
            OutboundEvent::StopTyping(identity.clone()),
        );
        Some(identity)
    }

    /// ペイロードの user（前後の空白を除いた Identity）を優先し、なければ Registry から解決する
    fn typing_identity(&self, connection: &ConnectionId, user: Option<&str>) -> Option<Identity> {
        let identity = user
            .and_then(|user| Identity::new(user).ok())
            .or_else(|| self.registry.identity_of(connection).cloned());
        if identity.is_none() {
            tracing::debug!("Dropped typing event from unidentified '{}'", connection);
        }
        identity
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::usecase::test_support::{connect, connect_and_join, create_test_broadcaster};

    #[test]
    fn test_typing_then_stop_typing_arrive_in_order() {
        // テスト項目: typing → stop typing の順に他の参加者へ届き、送信元には届かない
        // given (前提条件):
        let mut broadcaster = create_test_broadcaster();
        let mut alice = connect_and_join(&mut broadcaster, "a", "alice");
        let mut bob = connect_and_join(&mut broadcaster, "b", "bob");
        alice.frames();
        bob.frames();

        // when (操作):
        broadcaster.typing(&alice.connection, Some("alice"));
        broadcaster.stop_typing(&alice.connection, Some("alice"));

        // then (期待する結果):
        assert_eq!(
            bob.events(),
            vec![
                json!({"event": "typing", "data": {"user": "alice"}}),
                json!({"event": "stop typing", "data": {"user": "alice"}}),
            ]
        );
        assert!(alice.frames().is_empty());
    }

    #[test]
    fn test_typing_without_user_uses_registry_identity() {
        // テスト項目: ペイロードに user がない場合は Registry の Identity が使われる
        let mut broadcaster = create_test_broadcaster();
        let alice = connect_and_join(&mut broadcaster, "a", "alice");

        let identity = broadcaster.typing(&alice.connection, None);

        assert_eq!(identity, Some(Identity::new("alice").unwrap()));
    }

    #[test]
    fn test_typing_user_is_trimmed_like_join() {
        // テスト項目: ペイロードの user は join と同じく前後の空白を除いた名前で中継される
        // given (前提条件):
        let mut broadcaster = create_test_broadcaster();
        let alice = connect_and_join(&mut broadcaster, "a", "alice");
        let mut bob = connect_and_join(&mut broadcaster, "b", "bob");
        bob.frames();

        // when (操作):
        broadcaster.typing(&alice.connection, Some(" alice "));

        // then (期待する結果):
        assert_eq!(
            bob.events(),
            vec![json!({"event": "typing", "data": {"user": "alice"}})]
        );
    }

    #[test]
    fn test_typing_is_not_deduplicated() {
        // テスト項目: 連続した typing も重複排除されずにそのまま中継される
        let mut broadcaster = create_test_broadcaster();
        let alice = connect_and_join(&mut broadcaster, "a", "alice");
        let mut bob = connect_and_join(&mut broadcaster, "b", "bob");
        bob.frames();

        for _ in 0..3 {
            broadcaster.typing(&alice.connection, None);
        }

        assert_eq!(bob.event_names(), vec!["typing"; 3]);
    }

    #[test]
    fn test_typing_from_unidentified_connection_is_dropped() {
        // テスト項目: 送信者を特定できない typing は破棄される
        // given (前提条件):
        let mut broadcaster = create_test_broadcaster();
        let stranger = connect(&mut broadcaster, "s");
        let mut bob = connect_and_join(&mut broadcaster, "b", "bob");
        bob.frames();

        // when (操作):
        let identity = broadcaster.stop_typing(&stranger.connection, Some("  "));

        // then (期待する結果):
        assert_eq!(identity, None);
        assert!(bob.frames().is_empty());
    }
}
