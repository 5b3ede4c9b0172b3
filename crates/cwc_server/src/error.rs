//! Server error types.

use thiserror::Error;

/// Result alias for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Errors that stop the server.
///
/// Problems with a single agent reply never surface here; the match reports
/// them to the agent and carries on.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket setup or accept failed.
    #[error("Network error: {0}")]
    Io(#[from] std::io::Error),

    /// The match could not be created or started.
    #[error(transparent)]
    Game(#[from] cwc_core::error::GameError),
}
