//! UseCase errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Dispatcher タスクが停止している
    #[error("Dispatcher is closed")]
    Closed,
}
