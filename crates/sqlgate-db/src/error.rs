//! Error types for database execution.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while running SQL against the tunneled database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// No connection could be opened through the tunnel.
    #[error("failed to connect to MySQL on 127.0.0.1:{port}: {source}")]
    Connect {
        port: u16,
        #[source]
        source: sqlx::Error,
    },

    /// Opening a connection did not finish in time.
    #[error("timed out after {0:?} connecting to MySQL")]
    ConnectTimeout(Duration),

    /// The server rejected or failed the statement.
    #[error("{0}")]
    Query(#[from] sqlx::Error),

    /// The statement was empty after trimming.
    #[error("empty SQL statement")]
    EmptyStatement,
}
