//! russh client: connect, authenticate, open `direct-tcpip` channels.

use crate::error::TunnelError;
use crate::forward::{ChannelOpener, ForwardedStream};
use async_trait::async_trait;
use russh::client;
use russh_keys::key::KeyPair;
use sqlgate_core::{TunnelAuth, TunnelConfig};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// SSH client handler for russh.
pub(crate) struct ClientHandler;

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh_keys::key::PublicKey,
    ) -> Result<bool, Self::Error> {
        // The jump host is operator-managed; its key is not pinned.
        tracing::debug!("Accepting SSH server host key");
        Ok(true)
    }
}

/// Credentials ready to hand to russh.
enum Credentials<'a> {
    Password(&'a str),
    Key(Arc<KeyPair>),
}

/// Connect to the jump host and authenticate.
///
/// Key files are loaded before any network I/O so a bad path or passphrase
/// fails without contacting the server.
pub(crate) async fn connect(
    config: &TunnelConfig,
) -> Result<client::Handle<ClientHandler>, TunnelError> {
    let credentials = match config.auth()? {
        TunnelAuth::Password(password) => Credentials::Password(password),
        TunnelAuth::PrivateKey { path, passphrase } => {
            tracing::info!(key = %path.display(), "Using SSH key authentication");
            Credentials::Key(load_private_key(path, passphrase).await?)
        }
    };

    let address = config.ssh_address();
    let ssh_config = Arc::new(client::Config::default());

    let mut handle = client::connect(
        ssh_config,
        (config.ssh_host.as_str(), config.ssh_port),
        ClientHandler,
    )
    .await
    .map_err(|e| TunnelError::Connect {
        address: address.clone(),
        reason: e.to_string(),
    })?;

    let authenticated = match credentials {
        Credentials::Password(password) => {
            tracing::info!("Using SSH password authentication");
            handle
                .authenticate_password(config.username.as_str(), password)
                .await?
        }
        Credentials::Key(key) => {
            handle
                .authenticate_publickey(config.username.as_str(), key)
                .await?
        }
    };

    if !authenticated {
        return Err(TunnelError::AuthenticationFailed {
            user: config.username.clone(),
            address,
        });
    }

    tracing::info!(
        user = %config.username,
        address = %address,
        "SSH authentication successful"
    );

    Ok(handle)
}

/// Load a private key from a file.
async fn load_private_key(path: &Path, passphrase: Option<&str>) -> Result<Arc<KeyPair>, TunnelError> {
    let key_data = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TunnelError::Key {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let key = russh_keys::decode_secret_key(&key_data, passphrase).map_err(|e| TunnelError::Key {
        path: path.to_path_buf(),
        reason: match passphrase {
            Some(_) => format!("could not decrypt key: {}", e),
            None => format!("could not parse key (encrypted keys need SSH_KEY_PASSPHRASE): {}", e),
        },
    })?;

    Ok(Arc::new(key))
}

/// [`ChannelOpener`] backed by an authenticated SSH session.
pub(crate) struct SshChannelOpener {
    handle: Mutex<client::Handle<ClientHandler>>,
}

impl SshChannelOpener {
    pub(crate) fn new(handle: client::Handle<ClientHandler>) -> Self {
        Self {
            handle: Mutex::new(handle),
        }
    }
}

#[async_trait]
impl ChannelOpener for SshChannelOpener {
    async fn open(&self, host: &str, port: u16) -> Result<ForwardedStream, TunnelError> {
        let channel = {
            let handle = self.handle.lock().await;
            handle
                .channel_open_direct_tcpip(host, port as u32, "127.0.0.1", 0)
                .await
                .map_err(|e| TunnelError::Channel {
                    host: host.to_string(),
                    port,
                    reason: e.to_string(),
                })?
        };

        Ok(Box::pin(channel.into_stream()))
    }

    async fn close(&self) {
        let handle = self.handle.lock().await;
        if let Err(e) = handle
            .disconnect(russh::Disconnect::ByApplication, "tunnel closed", "en")
            .await
        {
            tracing::debug!(error = %e, "SSH disconnect failed (session already closed?)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id_missing");

        let err = load_private_key(&path, None).await.err().unwrap();
        assert!(matches!(err, TunnelError::Key { .. }));
        assert!(err.to_string().contains("id_missing"));
    }

    #[tokio::test]
    async fn test_garbage_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not an openssh private key").unwrap();

        let err = load_private_key(file.path(), None).await.err().unwrap();
        match err {
            TunnelError::Key { reason, .. } => assert!(reason.contains("could not parse key")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_key_is_loaded_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let config = TunnelConfig {
            // TEST-NET-1: never routable, a connect attempt would hang or fail differently
            ssh_host: "192.0.2.1".to_string(),
            username: "deploy".to_string(),
            private_key_path: Some(dir.path().join("absent_key")),
            ..Default::default()
        };

        let err = connect(&config).await.err().unwrap();
        assert!(matches!(err, TunnelError::Key { .. }));
    }
}
