//! MCP server configuration.
//!
//! This module defines how the gateway exposes its tools to an agent.

use serde::{Deserialize, Serialize};

/// Configuration for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Transport type: "sse" or "stdio".
    #[serde(default)]
    pub transport: Transport,

    /// HTTP host (only used when transport is SSE).
    #[serde(default = "default_http_host")]
    pub host: String,

    /// HTTP port (only used when transport is SSE).
    #[serde(default = "default_http_port")]
    pub port: u16,
}

/// MCP transport type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// HTTP with a server-sent-events stream and a message endpoint.
    #[default]
    Sse,
    /// Standard input/output transport (for local agent hosts).
    Stdio,
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sse" | "http" => Ok(Transport::Sse),
            "stdio" => Ok(Transport::Stdio),
            other => Err(format!("unknown transport: {}. Use 'sse' or 'stdio'", other)),
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

impl McpConfig {
    /// Address the HTTP transport binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if using the SSE transport.
    pub fn is_sse(&self) -> bool {
        self.transport == Transport::Sse
    }

    /// Check if using stdio transport.
    pub fn is_stdio(&self) -> bool {
        self.transport == Transport::Stdio
    }
}

pub fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_http_port() -> u16 {
    8082
}
