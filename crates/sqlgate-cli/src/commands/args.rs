//! Gateway options shared by `serve` and `check`.
//!
//! Every option can be given as a flag or through the environment variable
//! named next to it. Blank values count as unset, so an `env_file` line like
//! `SSH_PASSWORD=` does not select password authentication.

use clap::Args;
use sqlgate_core::{
    DatabaseCredentials, GatewayConfig, LlmConfig, McpConfig, StartupConfig, Transport,
    TunnelConfig,
};
use std::path::PathBuf;

#[derive(Args, Clone)]
pub struct GatewayArgs {
    #[command(flatten)]
    pub ssh: SshArgs,

    #[command(flatten)]
    pub mysql: MysqlArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub mcp: McpArgs,
}

/// SSH jump host.
#[derive(Args, Clone)]
#[command(next_help_heading = "SSH tunnel")]
pub struct SshArgs {
    #[arg(long, env = "SSH_HOST")]
    pub ssh_host: Option<String>,

    #[arg(long, env = "SSH_PORT", default_value_t = 22)]
    pub ssh_port: u16,

    #[arg(long, env = "SSH_USERNAME")]
    pub ssh_username: Option<String>,

    #[arg(long, env = "SSH_PASSWORD", hide_env_values = true)]
    pub ssh_password: Option<String>,

    /// Private key file, used instead of a password.
    #[arg(long, env = "SSH_KEY_PATH")]
    pub ssh_key_path: Option<PathBuf>,

    #[arg(long, env = "SSH_KEY_PASSPHRASE", hide_env_values = true)]
    pub ssh_key_passphrase: Option<String>,

    /// Local port the tunnel listens on; 0 picks a free one.
    #[arg(long, env = "SSH_LOCAL_PORT", default_value_t = 0)]
    pub ssh_local_port: u16,

    /// Bound on SSH connect and authentication.
    #[arg(long, env = "SSH_TIMEOUT_SECS", default_value_t = 30)]
    pub ssh_timeout_secs: u64,
}

/// MySQL behind the jump host.
#[derive(Args, Clone)]
#[command(next_help_heading = "MySQL")]
pub struct MysqlArgs {
    /// Database host as seen from the jump host.
    #[arg(long, env = "MYSQL_REMOTE_HOST", default_value = "localhost")]
    pub mysql_remote_host: String,

    #[arg(long, env = "MYSQL_REMOTE_PORT", default_value_t = 3306)]
    pub mysql_remote_port: u16,

    #[arg(long, env = "MYSQL_USER")]
    pub mysql_user: Option<String>,

    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    pub mysql_password: Option<String>,

    #[arg(long, env = "MYSQL_DATABASE")]
    pub mysql_database: Option<String>,

    #[arg(long, env = "MYSQL_CONNECT_TIMEOUT_SECS", default_value_t = 10)]
    pub mysql_connect_timeout_secs: u64,

    /// Statement run once at startup to prove the database is reachable.
    #[arg(long, env = "SMOKE_QUERY", default_value = "SELECT 1")]
    pub smoke_query: String,
}

/// Translation backend.
#[derive(Args, Clone)]
#[command(next_help_heading = "LLM backend")]
pub struct LlmArgs {
    /// One of ollama, lmstudio, claude, openai, gemini.
    #[arg(long, env = "LLM_TYPE", default_value = "ollama")]
    pub llm_type: String,

    #[arg(long, env = "OLLAMA_HOST", default_value = "http://localhost:11434")]
    pub ollama_host: String,

    #[arg(long, env = "OLLAMA_MODEL", default_value = "codellama")]
    pub ollama_model: String,

    #[arg(long, env = "LMSTUDIO_BASE_URL", default_value = "http://localhost:1234/v1")]
    pub lmstudio_base_url: String,

    #[arg(long, env = "LMSTUDIO_MODEL", default_value = "local-model")]
    pub lmstudio_model: String,

    #[arg(long, env = "CLAUDE_MODEL", default_value = "claude-3-5-sonnet-20241022")]
    pub claude_model: String,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub openai_model: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-1.5-flash")]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 120)]
    pub llm_timeout_secs: u64,
}

/// How agents reach the tools.
#[derive(Args, Clone)]
#[command(next_help_heading = "MCP server")]
pub struct McpArgs {
    /// sse or stdio.
    #[arg(long, env = "MCP_TRANSPORT", default_value = "sse")]
    pub mcp_transport: Transport,

    #[arg(long, env = "MCP_HOST", default_value = "0.0.0.0")]
    pub mcp_host: String,

    #[arg(long, env = "MCP_PORT", default_value_t = 8082)]
    pub mcp_port: u16,
}

impl GatewayArgs {
    /// Assemble the configuration. Nothing is validated here.
    pub fn into_config(self) -> GatewayConfig {
        let Self {
            ssh,
            mysql,
            llm,
            mcp,
        } = self;

        GatewayConfig {
            tunnel: TunnelConfig {
                ssh_host: non_empty(ssh.ssh_host).unwrap_or_default(),
                ssh_port: ssh.ssh_port,
                username: non_empty(ssh.ssh_username).unwrap_or_default(),
                password: non_empty(ssh.ssh_password),
                private_key_path: ssh
                    .ssh_key_path
                    .filter(|path| !path.as_os_str().is_empty()),
                key_passphrase: non_empty(ssh.ssh_key_passphrase),
                remote_host: mysql.mysql_remote_host,
                remote_port: mysql.mysql_remote_port,
                local_bind_port: ssh.ssh_local_port,
                connect_timeout_secs: ssh.ssh_timeout_secs,
            },
            database: DatabaseCredentials::new(
                non_empty(mysql.mysql_user).unwrap_or_default(),
                non_empty(mysql.mysql_password).unwrap_or_default(),
                non_empty(mysql.mysql_database).unwrap_or_default(),
            ),
            startup: StartupConfig {
                smoke_query: mysql.smoke_query,
                db_connect_timeout_secs: mysql.mysql_connect_timeout_secs,
            },
            llm: LlmConfig {
                llm_type: llm.llm_type,
                ollama_host: llm.ollama_host,
                ollama_model: llm.ollama_model,
                lmstudio_base_url: llm.lmstudio_base_url,
                lmstudio_model: llm.lmstudio_model,
                claude_model: llm.claude_model,
                anthropic_api_key: non_empty(llm.anthropic_api_key),
                openai_base_url: llm.openai_base_url,
                openai_model: llm.openai_model,
                openai_api_key: non_empty(llm.openai_api_key),
                gemini_model: llm.gemini_model,
                gemini_api_key: non_empty(llm.gemini_api_key),
                timeout_secs: llm.llm_timeout_secs,
            },
            mcp: McpConfig {
                transport: mcp.mcp_transport,
                host: mcp.mcp_host,
                port: mcp.mcp_port,
            },
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches, Parser};
    use sqlgate_core::ConfigError;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: GatewayArgs,
    }

    fn parse(extra: &[&str]) -> GatewayConfig {
        let mut argv = vec![
            "sqlgate",
            "--ssh-host",
            "bastion.internal",
            "--ssh-username",
            "deploy",
            "--mysql-user",
            "app",
            "--mysql-password",
            "secret",
            "--mysql-database",
            "shop",
        ];
        argv.extend_from_slice(extra);

        // Parse from argv alone so variables set in the test environment are ignored.
        let matches = TestCli::command()
            .mut_args(|arg| arg.env(None::<&str>))
            .try_get_matches_from(argv)
            .unwrap();
        GatewayArgs::from_arg_matches(&matches).unwrap().into_config()
    }

    #[test]
    fn test_options_declare_env_fallbacks() {
        let command = TestCli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|name| name.to_str())
                .map(String::from)
        };

        assert_eq!(env_of("ssh_host").as_deref(), Some("SSH_HOST"));
        assert_eq!(
            env_of("anthropic_api_key").as_deref(),
            Some("ANTHROPIC_API_KEY")
        );
        assert_eq!(
            env_of("mysql_connect_timeout_secs").as_deref(),
            Some("MYSQL_CONNECT_TIMEOUT_SECS")
        );
        assert!(command.get_arguments().all(|arg| arg.get_env().is_some()
            || arg.get_id() == "help"
            || arg.get_id() == "version"));
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--ssh-password", "hunter2"]);

        assert_eq!(config.tunnel.ssh_port, 22);
        assert_eq!(config.tunnel.remote_host, "localhost");
        assert_eq!(config.tunnel.remote_port, 3306);
        assert_eq!(config.tunnel.local_bind_port, 0);
        assert_eq!(config.startup.smoke_query, "SELECT 1");
        assert_eq!(config.llm.llm_type, "ollama");
        assert_eq!(config.mcp.transport, Transport::Sse);
        assert_eq!(config.mcp.port, 8082);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_password_counts_as_unset() {
        let config = parse(&["--ssh-password", "", "--ssh-key-path", "/keys/id_ed25519"]);

        assert!(config.tunnel.password.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_auth_is_rejected() {
        let config = parse(&[]);
        assert_eq!(config.validate(), Err(ConfigError::NoSshAuth));
    }

    #[test]
    fn test_stdio_transport() {
        let config = parse(&["--ssh-password", "x", "--mcp-transport", "stdio"]);
        assert_eq!(config.mcp.transport, Transport::Stdio);
    }

    #[test]
    fn test_claude_needs_key() {
        let config = parse(&["--ssh-password", "x", "--llm-type", "claude"]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingApiKey {
                key: "ANTHROPIC_API_KEY",
                backend: "Claude",
            })
        );
    }
}
