//! Local listener and per-connection forwarding.
//!
//! The accept loop is independent of SSH: it only needs something that can
//! open a byte stream to `host:port` on the far side, expressed as a
//! [`ChannelOpener`].

use crate::error::TunnelError;
use async_trait::async_trait;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Pause after a failed accept. Errors such as EMFILE repeat until a
/// descriptor is released.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bidirectional byte stream to the forwarded destination.
pub trait ForwardIo: AsyncRead + AsyncWrite + Send {}

impl<T: AsyncRead + AsyncWrite + Send> ForwardIo for T {}

/// Boxed stream returned by a [`ChannelOpener`].
pub type ForwardedStream = Pin<Box<dyn ForwardIo>>;

/// Opens streams to the remote side of the tunnel.
#[async_trait]
pub trait ChannelOpener: Send + Sync + 'static {
    /// Open a stream to `host:port` as seen from the far end.
    async fn open(&self, host: &str, port: u16) -> Result<ForwardedStream, TunnelError>;

    /// Release the underlying transport. Called once when the tunnel stops.
    async fn close(&self) {}
}

/// Accept local connections until `cancel` fires, forwarding each one.
///
/// Returns only after every spawned forwarder has finished, so the listener
/// and all accepted sockets are closed when this future completes.
pub(crate) async fn run_forwarder(
    listener: TcpListener,
    opener: Arc<dyn ChannelOpener>,
    remote_host: String,
    remote_port: u16,
    cancel: CancellationToken,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Forwarder cancelled");
                break;
            }
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((local_stream, peer_addr)) => {
                        tracing::debug!(peer = %peer_addr, "New tunnel connection");

                        let opener = opener.clone();
                        let remote_host = remote_host.clone();
                        let cancel = cancel.clone();

                        connections.spawn(async move {
                            if let Err(e) = forward_connection(
                                local_stream,
                                opener,
                                &remote_host,
                                remote_port,
                                cancel,
                            )
                            .await
                            {
                                tracing::warn!(error = %e, "Tunnel forwarding error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to accept tunnel connection");
                        if !back_off(&cancel).await {
                            break;
                        }
                    }
                }
            }
        }
    }

    drop(listener);
    while connections.join_next().await.is_some() {}
}

/// Wait [`ACCEPT_BACKOFF`]. Returns `false` if cancelled first.
async fn back_off(cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(ACCEPT_BACKOFF) => true,
        _ = cancel.cancelled() => false,
    }
}

/// Pump bytes between one local socket and one remote stream.
async fn forward_connection(
    mut local_stream: TcpStream,
    opener: Arc<dyn ChannelOpener>,
    remote_host: &str,
    remote_port: u16,
    cancel: CancellationToken,
) -> Result<(), TunnelError> {
    let mut remote = tokio::select! {
        opened = opener.open(remote_host, remote_port) => opened?,
        _ = cancel.cancelled() => return Ok(()),
    };

    tokio::select! {
        result = tokio::io::copy_bidirectional(&mut local_stream, &mut remote) => {
            let (sent, received) = result?;
            tracing::debug!(sent, received, "Tunnel connection closed");
        }
        _ = cancel.cancelled() => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_back_off_waits() {
        let started = Instant::now();
        assert!(back_off(&CancellationToken::new()).await);
        assert!(started.elapsed() >= ACCEPT_BACKOFF);
    }

    #[tokio::test]
    async fn test_back_off_ends_on_cancel() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let started = Instant::now();
        assert!(!back_off(&cancel).await);
        assert!(started.elapsed() < ACCEPT_BACKOFF);
    }
}
