//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EventBroadcaster::disconnect() メソッド
//! - 切断時の登録解除と、残りの参加者への user left / user list の配信
//!
//! ### なぜこのテストが必要か
//! - 強制ログアウトされた接続の切断が、新しいセッションを巻き込まないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断と通知
//! - エッジケース：join していない接続、置き換え済みの接続の切断

use crate::domain::{ConnectionId, Identity, OutboundEvent};

use super::broadcaster::{Audience, EventBroadcaster};

impl EventBroadcaster {
    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(Identity)` - この接続が保持していた Identity（残りの参加者に通知済み）
    /// * `None` - join していない、またはすでに置き換えられていた接続（通知しない）
    pub fn disconnect(&mut self, connection: &ConnectionId) -> Option<Identity> {
        self.pusher.unregister_client(connection);

        let Some(identity) = self.registry.unregister(connection) else {
            tracing::debug!("Connection '{}' closed without an active session", connection);
            return None;
        };

        self.emit(
            connection,
            Audience::All,
            OutboundEvent::UserLeft(identity.clone()),
        );
        self.emit(
            connection,
            Audience::All,
            OutboundEvent::UserList(self.registry.list_identities()),
        );

        tracing::info!("{} disconnected ({})", identity, connection);
        Some(identity)
    }
}
