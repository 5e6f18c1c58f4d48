//! # sqlgate-core
//!
//! Configuration types shared across the sqlgate crates.
//!
//! Every option the gateway understands lives here as a plain struct. The CLI
//! fills them from flags and environment variables; the runtime validates the
//! assembled [`GatewayConfig`] before any network I/O happens.

// Configuration types shared across all sqlgate crates
pub mod config;
pub mod error;

pub use config::{
    DatabaseCredentials, GatewayConfig, LlmBackend, LlmConfig, LlmType, McpConfig, StartupConfig,
    Transport, TunnelAuth, TunnelConfig,
};
pub use error::ConfigError;
