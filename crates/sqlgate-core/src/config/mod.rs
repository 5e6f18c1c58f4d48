//! Configuration types for the sqlgate gateway.
//!
//! The gateway is configured entirely through options that the CLI accepts as
//! flags or environment variables. They are grouped here by the component
//! that consumes them:
//!
//! - **tunnel**: SSH jump host, authentication and forwarded database address
//! - **database**: MySQL credentials used through the tunnel
//! - **llm**: which natural-language-to-SQL backend to use and its settings
//! - **mcp**: how the tools are exposed to the calling agent
//! - **startup**: timeouts and the smoke query run before serving

pub mod database;
pub mod llm;
pub mod mcp;
pub mod tunnel;

use crate::error::ConfigError;
use std::time::Duration;

pub use database::DatabaseCredentials;
pub use llm::{LlmBackend, LlmConfig, LlmType};
pub use mcp::{McpConfig, Transport};
pub use tunnel::{TunnelAuth, TunnelConfig};

/// Startup checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Statement run once the database facade exists, before serving.
    pub smoke_query: String,

    /// Upper bound on each database connection attempt, in seconds.
    pub db_connect_timeout_secs: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            smoke_query: default_smoke_query(),
            db_connect_timeout_secs: default_db_connect_timeout(),
        }
    }
}

impl StartupConfig {
    pub fn db_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.db_connect_timeout_secs)
    }
}

/// Complete gateway configuration.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// SSH tunnel to the database host.
    pub tunnel: TunnelConfig,

    /// MySQL credentials.
    pub database: DatabaseCredentials,

    /// Startup checks.
    pub startup: StartupConfig,

    /// Translation backend.
    pub llm: LlmConfig,

    /// MCP server settings.
    pub mcp: McpConfig,
}

impl GatewayConfig {
    /// Validate every section. Performs no I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tunnel.validate()?;
        self.database.validate()?;

        if self.startup.smoke_query.trim().is_empty() {
            return Err(ConfigError::Missing("SMOKE_QUERY"));
        }
        if self.startup.db_connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "MYSQL_CONNECT_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        self.llm.backend()?;
        Ok(())
    }

    /// Human-readable summary with secrets omitted.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let auth = match self.tunnel.auth() {
            Ok(TunnelAuth::Password(_)) => "password".to_string(),
            Ok(TunnelAuth::PrivateKey { path, passphrase }) => format!(
                "private key {}{}",
                path.display(),
                if passphrase.is_some() { " (encrypted)" } else { "" }
            ),
            Err(e) => format!("invalid ({})", e),
        };
        let local_port = match self.tunnel.local_bind_port {
            0 => "ephemeral".to_string(),
            port => port.to_string(),
        };

        vec![
            ("ssh", format!("{}@{}", self.tunnel.username, self.tunnel.ssh_address())),
            ("ssh auth", auth),
            (
                "forward",
                format!(
                    "127.0.0.1:{} -> {}:{}",
                    local_port, self.tunnel.remote_host, self.tunnel.remote_port
                ),
            ),
            (
                "mysql",
                format!("{}@{}", self.database.user, self.database.database),
            ),
            ("smoke query", self.startup.smoke_query.clone()),
            ("llm", self.llm.llm_type.clone()),
            (
                "mcp",
                match self.mcp.transport {
                    Transport::Sse => format!("sse on {}", self.mcp.bind_address()),
                    Transport::Stdio => "stdio".to_string(),
                },
            ),
        ]
    }
}

fn default_smoke_query() -> String {
    "SELECT 1".to_string()
}

fn default_db_connect_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GatewayConfig {
        GatewayConfig {
            tunnel: TunnelConfig {
                ssh_host: "bastion".to_string(),
                username: "deploy".to_string(),
                password: Some("hunter2".to_string()),
                ..Default::default()
            },
            database: DatabaseCredentials::new("app", "secret", "warehouse"),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_database_name() {
        let mut config = valid_config();
        config.database.database.clear();
        assert_eq!(config.validate(), Err(ConfigError::Missing("MYSQL_DATABASE")));
    }

    #[test]
    fn test_unknown_llm_type() {
        let mut config = valid_config();
        config.llm.llm_type = "palm".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownLlmType(t)) if t == "palm"
        ));
    }

    #[test]
    fn test_empty_smoke_query() {
        let mut config = valid_config();
        config.startup.smoke_query = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::Missing("SMOKE_QUERY")));
    }

    #[test]
    fn test_summary_omits_secrets() {
        let summary = valid_config().summary();
        let text = summary
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("deploy@bastion:22"));
        assert!(text.contains("127.0.0.1:ephemeral -> localhost:3306"));
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("secret"));
    }
}
