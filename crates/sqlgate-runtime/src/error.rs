//! Fatal errors of the session lifecycle.

use crate::lifecycle::SessionState;
use sqlgate_core::ConfigError;
use sqlgate_db::DatabaseError;
use sqlgate_mcp::McpError;
use sqlgate_translate::TranslationError;
use sqlgate_tunnel::TunnelError;
use std::time::Duration;
use thiserror::Error;

/// An error that ends the process.
///
/// Errors raised while serving individual operations never end up here; the
/// dispatcher turns those into tool results.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("SSH tunnel failed: {0}")]
    Tunnel(#[from] TunnelError),

    /// Raised by the smoke query.
    #[error("database check failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("smoke query did not finish within {0:?}")]
    SmokeTimeout(Duration),

    #[error("translation backend could not be initialized: {0}")]
    Translation(#[from] TranslationError),

    /// The MCP transport could not start or stopped with an error.
    #[error("MCP server error: {0}")]
    Mcp(#[from] McpError),

    /// The requested transition is not allowed from the current state.
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: SessionState,
    },
}
