//! Dispatcher
//!
//! 全接続からのコマンドを 1 本の channel で受け取り、`EventBroadcaster` に逐次適用するタスク。
//!
//! ## 並行性
//!
//! - コアの状態（Registry と Pusher の送信先）はこのタスクだけが所有する
//! - 1 つのコマンドの処理中に `.await` は挟まない。次のコマンドは前の処理が完了してから受け取る
//! - 各接続は自分のイベントを受信順に送るため、接続ごとの順序は保たれる

use tokio::sync::{mpsc, oneshot};

use crate::domain::{ConnectionId, Identity, InboundEvent, PusherChannel};

use super::{broadcaster::EventBroadcaster, error::DispatchError};

/// Dispatcher に送られるコマンド
#[derive(Debug)]
pub enum Command {
    /// トランスポート接続の確立
    Connect {
        connection: ConnectionId,
        channel: PusherChannel,
    },
    /// クライアントからのイベント
    Event {
        connection: ConnectionId,
        event: InboundEvent,
    },
    /// トランスポート接続の切断
    Disconnect { connection: ConnectionId },
    /// 接続中の Identity 一覧の取得
    ListParticipants { reply: oneshot::Sender<Vec<Identity>> },
}

pub struct Dispatcher {
    broadcaster: EventBroadcaster,
    rx: mpsc::UnboundedReceiver<Command>,
}

/// Dispatcher へコマンドを送るためのハンドル（clone して各接続に配る）
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl Dispatcher {
    pub fn new(broadcaster: EventBroadcaster) -> (Self, DispatcherHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { broadcaster, rx }, DispatcherHandle { tx })
    }

    /// 全てのハンドルが破棄されるまでコマンドを処理し続ける
    pub async fn run(mut self) {
        tracing::debug!("Dispatcher started");
        while let Some(command) = self.rx.recv().await {
            self.handle(command);
        }
        tracing::info!("Dispatcher stopped");
    }

    /// 1 つのコマンドを完了まで処理する
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Connect {
                connection,
                channel,
            } => self.broadcaster.connect(connection, channel),
            Command::Event { connection, event } => self.broadcaster.handle(&connection, event),
            Command::Disconnect { connection } => {
                self.broadcaster.disconnect(&connection);
            }
            Command::ListParticipants { reply } => {
                // 要求元がすでにいなくなっていても問題ない
                let _ = reply.send(self.broadcaster.participants());
            }
        }
    }
}

impl DispatcherHandle {
    pub fn connect(
        &self,
        connection: ConnectionId,
        channel: PusherChannel,
    ) -> Result<(), DispatchError> {
        self.send(Command::Connect {
            connection,
            channel,
        })
    }

    pub fn dispatch(
        &self,
        connection: ConnectionId,
        event: InboundEvent,
    ) -> Result<(), DispatchError> {
        self.send(Command::Event { connection, event })
    }

    pub fn disconnect(&self, connection: ConnectionId) -> Result<(), DispatchError> {
        self.send(Command::Disconnect { connection })
    }

    /// 接続中の Identity 一覧（登録順）
    pub async fn participants(&self) -> Result<Vec<Identity>, DispatchError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ListParticipants { reply })?;
        rx.await.map_err(|_| DispatchError::Closed)
    }

    fn send(&self, command: Command) -> Result<(), DispatchError> {
        self.tx.send(command).map_err(|_| DispatchError::Closed)
    }
}
