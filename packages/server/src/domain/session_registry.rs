//! Session Registry
//!
//! 接続（ConnectionId）と表示名（Identity）の双方向マッピング。
//!
//! ## 不変条件
//!
//! - `identities`（接続 → 表示名）と `holders`（表示名 → 接続）は常に一致する
//! - 1 つの Identity を保持できる接続は同時に 1 つだけ
//!
//! ロックは持たない。Dispatcher タスクが唯一の所有者として逐次的に操作する。

use std::collections::HashMap;

use super::{
    error::RegistryError,
    value_object::{ConnectionId, Identity},
};

/// `register` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// 登録された Identity（trim 済み）
    pub identity: Identity,
    /// 同じ Identity を保持していたために置き換えられた接続
    pub superseded: Option<ConnectionId>,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    identities: HashMap<ConnectionId, Identity>,
    holders: HashMap<Identity, ConnectionId>,
    /// 登録順の Identity 一覧（`list_identities` の順序）
    order: Vec<Identity>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続を表示名で登録する
    ///
    /// # Arguments
    ///
    /// * `connection` - join した接続
    /// * `raw_name` - クライアントが送ってきた生の表示名
    ///
    /// # Returns
    ///
    /// * `Ok(Registration)` - 登録成功。別の接続が同じ Identity を保持していた場合は
    ///   `superseded` にその接続が入る（呼び出し側が強制ログアウトさせる）
    /// * `Err(RegistryError::InvalidIdentity)` - trim 後に空。Registry は変更されない
    pub fn register(
        &mut self,
        connection: ConnectionId,
        raw_name: &str,
    ) -> Result<Registration, RegistryError> {
        let identity = Identity::new(raw_name)
            .map_err(|_| RegistryError::InvalidIdentity(raw_name.to_string()))?;

        // 同じ接続が別の名前で join し直した場合、以前の名前を解放する
        if let Some(previous) = self.identities.get(&connection).cloned()
            && previous != identity
        {
            self.release(&previous, &connection);
        }

        let superseded = match self.holders.get(&identity) {
            Some(holder) if holder != &connection => Some(holder.clone()),
            _ => None,
        };
        if let Some(old) = &superseded {
            self.identities.remove(old);
        }

        self.identities.insert(connection.clone(), identity.clone());
        if self.holders.insert(identity.clone(), connection).is_none() {
            self.order.push(identity.clone());
        }

        Ok(Registration {
            identity,
            superseded,
        })
    }

    /// 接続の登録を解除する
    ///
    /// この接続が Identity の現在の保持者である場合のみ削除し、解放された Identity を返す。
    /// 未 join の接続や、すでに置き換えられた接続に対しては `None` を返す。
    pub fn unregister(&mut self, connection: &ConnectionId) -> Option<Identity> {
        let identity = self.identities.remove(connection)?;
        if self.release(&identity, connection) {
            Some(identity)
        } else {
            None
        }
    }

    pub fn identity_of(&self, connection: &ConnectionId) -> Option<&Identity> {
        self.identities.get(connection)
    }

    /// 現在の保持者を返す
    #[cfg(test)]
    pub(crate) fn holder_of(&self, identity: &Identity) -> Option<&ConnectionId> {
        self.holders.get(identity)
    }

    /// 接続中の全 Identity のスナップショット（登録順）
    pub fn list_identities(&self) -> Vec<Identity> {
        self.order.clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.holders.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    /// `connection` が保持者である場合に限り Identity → 接続の対応を削除する
    fn release(&mut self, identity: &Identity, connection: &ConnectionId) -> bool {
        if self.holders.get(identity) != Some(connection) {
            return false;
        }
        self.holders.remove(identity);
        self.order.retain(|held| held != identity);
        true
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        assert_eq!(self.identities.len(), self.holders.len());
        assert_eq!(self.order.len(), self.holders.len());
        for (connection, identity) in &self.identities {
            assert_eq!(self.holders.get(identity), Some(connection));
        }
        for identity in &self.order {
            assert!(self.holders.contains_key(identity));
        }
    }
}
