//! Error types for the tunnel crate.

use sqlgate_core::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while establishing or running the tunnel.
#[derive(Debug, Error)]
pub enum TunnelError {
    /// The tunnel configuration is incomplete or contradictory.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Could not reach the SSH server.
    #[error("failed to connect to SSH server {address}: {reason}")]
    Connect { address: String, reason: String },

    /// The SSH server rejected the credentials.
    #[error("SSH authentication failed for {user}@{address}")]
    AuthenticationFailed { user: String, address: String },

    /// The private key could not be read or decoded.
    #[error("failed to load SSH key {}: {reason}", path.display())]
    Key { path: PathBuf, reason: String },

    /// Connect + authentication did not finish in time.
    #[error("timed out after {0:?} establishing SSH tunnel")]
    Timeout(Duration),

    /// The local forwarding port could not be bound.
    #[error("failed to bind local port {port}: {source}")]
    Bind {
        port: u16,
        source: std::io::Error,
    },

    /// The jump host refused to open a forwarding channel.
    #[error("failed to open forwarding channel to {host}:{port}: {reason}")]
    Channel {
        host: String,
        port: u16,
        reason: String,
    },

    /// SSH protocol error.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
