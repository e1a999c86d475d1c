//! Server state.

use crate::usecase::DispatcherHandle;

use super::config::ServerConfig;

/// Shared application state
pub struct AppState {
    /// Dispatcher へのハンドル（コアの状態はすべて Dispatcher タスクが所有する）
    pub dispatcher: DispatcherHandle,
    pub config: ServerConfig,
}
