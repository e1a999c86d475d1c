//! Helpers shared by the use case tests.

use std::sync::Arc;

use parlor_shared::time::FixedClock;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, PushFrame},
    infrastructure::message_pusher::WebSocketMessagePusher,
};

use super::broadcaster::EventBroadcaster;

pub const NOW: i64 = 1_700_000_000_000;

pub fn create_test_broadcaster() -> EventBroadcaster {
    EventBroadcaster::new(
        Box::new(WebSocketMessagePusher::new()),
        Arc::new(FixedClock::new(NOW)),
    )
}

/// 送信キューを直接読むテスト用クライアント
pub struct TestClient {
    pub connection: ConnectionId,
    rx: mpsc::UnboundedReceiver<PushFrame>,
}

impl TestClient {
    /// キューに積まれている全フレーム
    pub fn frames(&mut self) -> Vec<PushFrame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// キューに積まれているイベント（JSON）。Close フレームは含まない
    pub fn events(&mut self) -> Vec<Value> {
        self.frames()
            .into_iter()
            .filter_map(|frame| match frame {
                PushFrame::Text(content) => serde_json::from_str(&content).ok(),
                PushFrame::Close(_) => None,
            })
            .collect()
    }

    /// キューに積まれているイベント名
    pub fn event_names(&mut self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| event["event"].as_str().map(str::to_string))
            .collect()
    }
}

pub fn connect(broadcaster: &mut EventBroadcaster, id: &str) -> TestClient {
    let (tx, rx) = mpsc::unbounded_channel();
    let connection = ConnectionId::new(id);
    broadcaster.connect(connection.clone(), tx);
    TestClient { connection, rx }
}

/// 接続して join する（join 時に届いたイベントはキューに残る）
pub fn connect_and_join(broadcaster: &mut EventBroadcaster, id: &str, name: &str) -> TestClient {
    let client = connect(broadcaster, id);
    broadcaster
        .join(&client.connection, name)
        .expect("join should succeed");
    client
}
