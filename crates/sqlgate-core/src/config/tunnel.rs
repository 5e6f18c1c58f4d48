//! SSH tunnel configuration types.
//!
//! The database is only reachable from the jump host, so every connection the
//! gateway makes goes through a local port forwarded over SSH:
//!
//! ```text
//! 127.0.0.1:<local_bind_port> ──ssh──▶ <ssh_host>:<ssh_port> ──▶ <remote_host>:<remote_port>
//! ```

use crate::error::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the SSH forwarding tunnel.
#[derive(Clone)]
pub struct TunnelConfig {
    /// Jump host to authenticate against.
    pub ssh_host: String,

    /// SSH port of the jump host.
    pub ssh_port: u16,

    /// SSH user name.
    pub username: String,

    /// Password authentication.
    pub password: Option<String>,

    /// Private key authentication.
    pub private_key_path: Option<PathBuf>,

    /// Passphrase for an encrypted private key.
    pub key_passphrase: Option<String>,

    /// Database host as seen from the jump host.
    pub remote_host: String,

    /// Database port as seen from the jump host.
    pub remote_port: u16,

    /// Local loopback port to listen on. `0` lets the OS pick one.
    pub local_bind_port: u16,

    /// Upper bound on SSH connect + authentication, in seconds.
    pub connect_timeout_secs: u64,
}

/// The single authentication method selected by a [`TunnelConfig`].
#[derive(Clone, PartialEq, Eq)]
pub enum TunnelAuth<'a> {
    Password(&'a str),
    PrivateKey {
        path: &'a Path,
        passphrase: Option<&'a str>,
    },
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            ssh_host: String::new(),
            ssh_port: default_ssh_port(),
            username: String::new(),
            password: None,
            private_key_path: None,
            key_passphrase: None,
            remote_host: default_remote_host(),
            remote_port: default_remote_port(),
            local_bind_port: 0,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl TunnelConfig {
    /// Check host, user and authentication without touching the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssh_host.trim().is_empty() {
            return Err(ConfigError::Missing("SSH_HOST"));
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::Missing("SSH_USERNAME"));
        }
        if self.remote_host.trim().is_empty() {
            return Err(ConfigError::Missing("MYSQL_REMOTE_HOST"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "SSH_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        self.auth().map(|_| ())
    }

    /// Resolve the authentication method. Exactly one must be configured.
    ///
    /// Empty strings count as unset. The passphrase only applies to key
    /// authentication and is ignored otherwise.
    pub fn auth(&self) -> Result<TunnelAuth<'_>, ConfigError> {
        let password = self.password.as_deref().filter(|p| !p.is_empty());
        let key_path = self
            .private_key_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty());

        match (password, key_path) {
            (Some(password), None) => Ok(TunnelAuth::Password(password)),
            (None, Some(path)) => Ok(TunnelAuth::PrivateKey {
                path,
                passphrase: self.key_passphrase.as_deref().filter(|p| !p.is_empty()),
            }),
            (None, None) => Err(ConfigError::NoSshAuth),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingSshAuth),
        }
    }

    /// Connect + authentication timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `host:port` of the jump host, for logging.
    pub fn ssh_address(&self) -> String {
        format!("{}:{}", self.ssh_host, self.ssh_port)
    }
}

impl fmt::Debug for TunnelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TunnelConfig")
            .field("ssh_host", &self.ssh_host)
            .field("ssh_port", &self.ssh_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("private_key_path", &self.private_key_path)
            .field("key_passphrase", &self.key_passphrase.as_ref().map(|_| "***"))
            .field("remote_host", &self.remote_host)
            .field("remote_port", &self.remote_port)
            .field("local_bind_port", &self.local_bind_port)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl fmt::Debug for TunnelAuth<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunnelAuth::Password(_) => f.write_str("Password(***)"),
            TunnelAuth::PrivateKey { path, passphrase } => f
                .debug_struct("PrivateKey")
                .field("path", path)
                .field("passphrase", &passphrase.map(|_| "***"))
                .finish(),
        }
    }
}

// Default value functions
pub fn default_ssh_port() -> u16 {
    22
}

pub fn default_remote_host() -> String {
    "localhost".to_string()
}

pub fn default_remote_port() -> u16 {
    3306
}

pub fn default_connect_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TunnelConfig {
        TunnelConfig {
            ssh_host: "bastion.example.com".to_string(),
            username: "deploy".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = TunnelConfig::default();
        assert_eq!(config.ssh_port, 22);
        assert_eq!(config.remote_host, "localhost");
        assert_eq!(config.remote_port, 3306);
        assert_eq!(config.local_bind_port, 0);
    }

    #[test]
    fn test_password_auth() {
        let config = TunnelConfig {
            password: Some("hunter2".to_string()),
            ..base()
        };
        assert_eq!(config.auth().unwrap(), TunnelAuth::Password("hunter2"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_key_auth_with_passphrase() {
        let config = TunnelConfig {
            private_key_path: Some(PathBuf::from("/keys/id_ed25519")),
            key_passphrase: Some("open sesame".to_string()),
            ..base()
        };
        match config.auth().unwrap() {
            TunnelAuth::PrivateKey { path, passphrase } => {
                assert_eq!(path, Path::new("/keys/id_ed25519"));
                assert_eq!(passphrase, Some("open sesame"));
            }
            other => panic!("unexpected auth: {:?}", other),
        }
    }

    #[test]
    fn test_no_auth_is_rejected() {
        assert_eq!(base().validate(), Err(ConfigError::NoSshAuth));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = TunnelConfig {
            password: Some(String::new()),
            private_key_path: Some(PathBuf::new()),
            ..base()
        };
        assert_eq!(config.auth(), Err(ConfigError::NoSshAuth));
    }

    #[test]
    fn test_both_auth_methods_are_rejected() {
        let config = TunnelConfig {
            password: Some("hunter2".to_string()),
            private_key_path: Some(PathBuf::from("/keys/id_rsa")),
            ..base()
        };
        assert_eq!(config.validate(), Err(ConfigError::ConflictingSshAuth));
    }

    #[test]
    fn test_missing_host_and_user() {
        let config = TunnelConfig {
            password: Some("x".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Missing("SSH_HOST")));

        let config = TunnelConfig {
            ssh_host: "bastion".to_string(),
            password: Some("x".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Missing("SSH_USERNAME")));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = TunnelConfig {
            password: Some("hunter2".to_string()),
            key_passphrase: Some("open sesame".to_string()),
            ..base()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("open sesame"));
        assert!(debug.contains("bastion.example.com"));
    }
}
