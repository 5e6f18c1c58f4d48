//! Configuration errors.

use thiserror::Error;

/// Missing or contradictory configuration.
///
/// Only raised while the gateway is starting; a running gateway never
/// re-reads its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required option is unset or empty.
    #[error("{0} is required")]
    Missing(&'static str),

    /// Neither SSH authentication method is configured.
    #[error("either SSH_PASSWORD or SSH_KEY_PATH must be set")]
    NoSshAuth,

    /// Both SSH authentication methods are configured.
    #[error("SSH_PASSWORD and SSH_KEY_PATH are mutually exclusive, set only one")]
    ConflictingSshAuth,

    /// `LLM_TYPE` names no supported backend.
    #[error("unknown LLM_TYPE: {0} (expected one of ollama, lmstudio, claude, openai, gemini)")]
    UnknownLlmType(String),

    /// A backend that needs an API key has none.
    #[error("{key} required for {backend}")]
    MissingApiKey {
        key: &'static str,
        backend: &'static str,
    },

    /// An option has a value that cannot be used.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
