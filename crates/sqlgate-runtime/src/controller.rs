//! The session lifecycle controller.
//!
//! Owns the tunnel and the dispatcher for the life of the process. Startup
//! brings components up in dependency order (tunnel, database, smoke query,
//! translator); every exit path, failed startup included, goes through the
//! same tunnel teardown.

use crate::error::StartupError;
use crate::factory::{ComponentFactory, LiveComponents};
use crate::lifecycle::SessionState;
use sqlgate_core::GatewayConfig;
use sqlgate_mcp::{Dispatcher, McpServer};
use sqlgate_tunnel::{TunnelManager, TunnelSession};
use tokio_util::sync::CancellationToken;

pub struct SessionController<F = LiveComponents> {
    config: GatewayConfig,
    factory: F,
    state: SessionState,
    tunnel: Option<TunnelSession>,
    dispatcher: Option<Dispatcher>,
}

impl SessionController<LiveComponents> {
    /// Controller backed by the real SSH, MySQL and LLM components.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_factory(config, LiveComponents)
    }
}

impl<F: ComponentFactory> SessionController<F> {
    pub fn with_factory(config: GatewayConfig, factory: F) -> Self {
        Self {
            config,
            factory,
            state: SessionState::Uninitialized,
            tunnel: None,
            dispatcher: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The live tunnel, while there is one.
    pub fn tunnel(&self) -> Option<&TunnelSession> {
        self.tunnel.as_ref()
    }

    /// Available once the session is [`SessionState::Ready`].
    pub fn dispatcher(&self) -> Option<&Dispatcher> {
        self.dispatcher.as_ref()
    }

    /// Bring the session up.
    ///
    /// On failure the tunnel (if it was opened) is stopped and the session
    /// ends in [`SessionState::Failed`].
    pub async fn start(&mut self) -> Result<(), StartupError> {
        if self.state != SessionState::Uninitialized {
            return Err(StartupError::InvalidState {
                action: "start",
                state: self.state,
            });
        }
        self.state = SessionState::Starting;

        match self.bring_up().await {
            Ok(dispatcher) => {
                self.dispatcher = Some(dispatcher);
                self.state = SessionState::Ready;
                tracing::info!("Session ready");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Startup failed");
                self.stop_tunnel().await;
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    async fn bring_up(&mut self) -> Result<Dispatcher, StartupError> {
        self.config.validate()?;
        let backend = self.config.llm.backend()?;

        let tunnel = self.factory.open_tunnel(&self.config.tunnel).await?;
        let local_port = tunnel.local_port();
        self.tunnel = Some(tunnel);

        let db = self
            .factory
            .connect_database(local_port, &self.config.database, &self.config.startup)
            .await?;

        // One bound covers connecting and running the statement.
        let smoke_query = &self.config.startup.smoke_query;
        let limit = self.config.startup.db_connect_timeout();
        tracing::info!(query = %smoke_query, ?limit, "Running smoke query");
        tokio::time::timeout(limit, db.execute(smoke_query))
            .await
            .map_err(|_| StartupError::SmokeTimeout(limit))??;
        tracing::info!(
            local_port,
            database = %self.config.database.database,
            "Database reachable through tunnel"
        );

        let translator = self
            .factory
            .build_translator(&backend, self.config.llm.timeout())
            .await?;

        Ok(Dispatcher::new(db, translator))
    }

    /// Serve tool calls until the transport ends or `shutdown` is cancelled,
    /// then tear the session down.
    ///
    /// In-flight operations are abandoned when `shutdown` fires.
    pub async fn serve(&mut self, shutdown: CancellationToken) -> Result<(), StartupError> {
        let Some(dispatcher) = self.dispatcher.clone() else {
            return Err(StartupError::InvalidState {
                action: "serve",
                state: self.state,
            });
        };

        let outcome = match McpServer::new(self.config.mcp.clone(), dispatcher) {
            Ok(server) => {
                tokio::select! {
                    result = server.run() => {
                        tracing::info!("MCP transport finished");
                        result.map_err(StartupError::from)
                    }
                    _ = shutdown.cancelled() => {
                        tracing::info!("Shutdown requested");
                        Ok(())
                    }
                }
            }
            Err(e) => Err(e.into()),
        };

        self.shutdown().await;
        outcome
    }

    /// Start, serve, and always tear down.
    ///
    /// A cancellation that arrives during startup skips serving and ends
    /// cleanly.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), StartupError> {
        let started = tokio::select! {
            result = self.start() => Some(result),
            _ = shutdown.cancelled() => None,
        };

        match started {
            Some(result) => result?,
            None => {
                tracing::info!("Shutdown requested during startup");
                self.shutdown().await;
                return Ok(());
            }
        }

        self.serve(shutdown).await
    }

    /// Stop accepting work and release the tunnel.
    ///
    /// Runs its teardown once; later calls, and calls on a failed session,
    /// do nothing.
    pub async fn shutdown(&mut self) {
        if self.state.is_terminal() || self.state == SessionState::ShuttingDown {
            return;
        }

        self.state = SessionState::ShuttingDown;
        tracing::info!("Shutting down session");

        self.dispatcher = None;
        self.stop_tunnel().await;

        self.state = SessionState::Stopped;
        tracing::info!("Session stopped");
    }

    async fn stop_tunnel(&mut self) {
        TunnelManager::stop(self.tunnel.as_ref()).await;
        self.tunnel = None;
    }
}
