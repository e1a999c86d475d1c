//! UseCase: 参加者 join 処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EventBroadcaster::join() メソッド
//! - 表示名の検証、重複ログイン時の強制ログアウト、join 通知と参加者リストの配信
//!
//! ### なぜこのテストが必要か
//! - 1 つの表示名を保持できる接続は常に 1 つだけであることを保証
//! - 置き換えられた接続が以後の配信を受け取らないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加者の join
//! - 異常系：空白のみの表示名
//! - エッジケース：同じ表示名での再ログイン（強制ログアウト）

use crate::domain::{ConnectionId, LogoutReason, OutboundEvent, Registration, RegistryError};

use super::broadcaster::{Audience, EventBroadcaster};

/// join 失敗時にクライアントへ返すメッセージ
pub const INVALID_USERNAME_MESSAGE: &str = "Invalid username";

impl EventBroadcaster {
    /// 参加者の join を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - join を要求した接続
    /// * `raw_name` - クライアントが送ってきた生の表示名
    ///
    /// # Returns
    ///
    /// * `Ok(Registration)` - join 成功
    /// * `Err(RegistryError)` - 表示名が不正（要求元にのみ join error を返し、配信は行わない）
    pub fn join(
        &mut self,
        connection: &ConnectionId,
        raw_name: &str,
    ) -> Result<Registration, RegistryError> {
        let registration = match self.registry.register(connection.clone(), raw_name) {
            Ok(registration) => registration,
            Err(e) => {
                tracing::warn!("Rejected join from '{}': {}", connection, e);
                self.emit(
                    connection,
                    Audience::SenderOnly,
                    OutboundEvent::JoinError {
                        message: INVALID_USERNAME_MESSAGE.to_string(),
                    },
                );
                return Err(e);
            }
        };

        // 1. 同じ表示名を保持していた接続を強制ログアウト
        //    新しいセッションの配信より先に送信対象から外す
        if let Some(superseded) = &registration.superseded {
            let reason = LogoutReason::DuplicateLogin;
            self.emit(
                connection,
                Audience::Connection(superseded.clone()),
                OutboundEvent::ForceLogout { reason },
            );
            self.pusher.close(superseded, reason);
            tracing::info!(
                "Forced logout of '{}' ({}): identity claimed by {}",
                registration.identity,
                superseded,
                connection
            );
        }

        // 2. 他の参加者に join を通知
        self.emit(
            connection,
            Audience::AllExceptSender,
            OutboundEvent::UserJoined(registration.identity.clone()),
        );

        // 3. 全員に参加者リストを配信
        self.emit(
            connection,
            Audience::All,
            OutboundEvent::UserList(self.registry.list_identities()),
        );

        tracing::info!("{} joined ({})", registration.identity, connection);
        Ok(registration)
    }
}
