//! Tunnel lifecycle: start a forwarding session, stop it exactly once.

use crate::error::TunnelError;
use crate::forward::{ChannelOpener, run_forwarder};
use crate::ssh::{self, SshChannelOpener};
use sqlgate_core::TunnelConfig;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to an active forwarding tunnel.
///
/// At most one exists per process; the lifecycle controller owns it.
pub struct TunnelSession {
    /// Local port the tunnel is listening on.
    local_port: u16,
    /// Remote host being tunneled to.
    remote_host: String,
    /// Remote port being tunneled to.
    remote_port: u16,
    /// Cancels the accept loop and every forwarder.
    cancel_token: CancellationToken,
    /// Accept loop task; taken by the first `stop`.
    task: Mutex<Option<JoinHandle<()>>>,
    opener: Arc<dyn ChannelOpener>,
}

impl TunnelSession {
    /// Local port the tunnel is listening on.
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Loopback address clients should connect to.
    pub fn local_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.local_port))
    }

    pub fn remote_host(&self) -> &str {
        &self.remote_host
    }

    pub fn remote_port(&self) -> u16 {
        self.remote_port
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Stop the tunnel.
    ///
    /// Idempotent. When this returns the local port has been released, all
    /// forwarded connections are closed and the SSH session is disconnected.
    /// A concurrent caller waits for the first one to finish.
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;
        let Some(handle) = task.take() else {
            tracing::debug!(local_port = self.local_port, "SSH tunnel already stopped");
            return;
        };

        self.cancel_token.cancel();
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Tunnel forwarder task ended abnormally");
        }
        self.opener.close().await;

        tracing::info!(local_port = self.local_port, "SSH tunnel closed");
    }
}

impl Drop for TunnelSession {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

impl std::fmt::Debug for TunnelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelSession")
            .field("local_port", &self.local_port)
            .field("remote_host", &self.remote_host)
            .field("remote_port", &self.remote_port)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Starts and stops tunnel sessions.
pub struct TunnelManager;

impl TunnelManager {
    /// Establish an SSH tunnel as described by `config`.
    ///
    /// The configuration is validated first; an incomplete one fails with
    /// [`TunnelError::Config`] before any network I/O. Connect and
    /// authentication are bounded by `config.connect_timeout()`. There is no
    /// retry.
    pub async fn start(config: &TunnelConfig) -> Result<TunnelSession, TunnelError> {
        config.validate()?;

        tracing::info!(
            address = %config.ssh_address(),
            user = %config.username,
            "Establishing SSH tunnel"
        );

        let timeout = config.connect_timeout();
        let handle = tokio::time::timeout(timeout, ssh::connect(config))
            .await
            .map_err(|_| TunnelError::Timeout(timeout))??;

        let opener: Arc<dyn ChannelOpener> = Arc::new(SshChannelOpener::new(handle));
        Self::start_with_opener(
            config.local_bind_port,
            &config.remote_host,
            config.remote_port,
            opener,
        )
        .await
    }

    /// Bind the local port and forward connections through `opener`.
    ///
    /// `local_port` 0 asks the OS for an ephemeral port. If binding fails the
    /// opener is closed before the error is returned.
    pub async fn start_with_opener(
        local_port: u16,
        remote_host: &str,
        remote_port: u16,
        opener: Arc<dyn ChannelOpener>,
    ) -> Result<TunnelSession, TunnelError> {
        let listener = match TcpListener::bind((Ipv4Addr::LOCALHOST, local_port)).await {
            Ok(listener) => listener,
            Err(source) => {
                opener.close().await;
                return Err(TunnelError::Bind {
                    port: local_port,
                    source,
                });
            }
        };

        let actual_local_port = match listener.local_addr() {
            Ok(addr) => addr.port(),
            Err(e) => {
                opener.close().await;
                return Err(e.into());
            }
        };

        tracing::info!(
            local_port = actual_local_port,
            remote = %format!("{}:{}", remote_host, remote_port),
            "SSH tunnel established"
        );

        let cancel_token = CancellationToken::new();
        let task = tokio::spawn(run_forwarder(
            listener,
            opener.clone(),
            remote_host.to_string(),
            remote_port,
            cancel_token.clone(),
        ));

        Ok(TunnelSession {
            local_port: actual_local_port,
            remote_host: remote_host.to_string(),
            remote_port,
            cancel_token,
            task: Mutex::new(Some(task)),
            opener,
        })
    }

    /// Stop a session if there is one. Safe on an already-stopped session.
    pub async fn stop(session: Option<&TunnelSession>) {
        if let Some(session) = session {
            session.stop().await;
        }
    }
}
