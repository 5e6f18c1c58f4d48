//! Construction of the components a session owns.

use async_trait::async_trait;
use sqlgate_core::{DatabaseCredentials, LlmBackend, StartupConfig, TunnelConfig};
use sqlgate_db::{DatabaseError, MySqlExecutor, SqlExecutor};
use sqlgate_translate::{LlmTranslator, TranslationError, Translator};
use sqlgate_tunnel::{TunnelError, TunnelManager, TunnelSession};
use std::sync::Arc;
use std::time::Duration;

/// Builds the tunnel, database facade and translator for a session.
///
/// The controller only decides the order and the cleanup; what gets built is
/// up to the factory.
#[async_trait]
pub trait ComponentFactory: Send + Sync {
    async fn open_tunnel(&self, config: &TunnelConfig) -> Result<TunnelSession, TunnelError>;

    /// Build the facade for a database forwarded to `127.0.0.1:local_port`.
    async fn connect_database(
        &self,
        local_port: u16,
        credentials: &DatabaseCredentials,
        startup: &StartupConfig,
    ) -> Result<Arc<dyn SqlExecutor>, DatabaseError>;

    async fn build_translator(
        &self,
        backend: &LlmBackend,
        timeout: Duration,
    ) -> Result<Arc<dyn Translator>, TranslationError>;
}

/// SSH tunnel, MySQL and the configured LLM backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveComponents;

#[async_trait]
impl ComponentFactory for LiveComponents {
    async fn open_tunnel(&self, config: &TunnelConfig) -> Result<TunnelSession, TunnelError> {
        TunnelManager::start(config).await
    }

    async fn connect_database(
        &self,
        local_port: u16,
        credentials: &DatabaseCredentials,
        startup: &StartupConfig,
    ) -> Result<Arc<dyn SqlExecutor>, DatabaseError> {
        Ok(Arc::new(MySqlExecutor::new(
            local_port,
            credentials,
            startup.db_connect_timeout(),
        )))
    }

    async fn build_translator(
        &self,
        backend: &LlmBackend,
        timeout: Duration,
    ) -> Result<Arc<dyn Translator>, TranslationError> {
        let translator = LlmTranslator::from_backend(backend, timeout)?;
        tracing::info!(
            llm_type = %backend.llm_type(),
            model = %backend.model(),
            "Translation backend ready"
        );
        Ok(Arc::new(translator))
    }
}
