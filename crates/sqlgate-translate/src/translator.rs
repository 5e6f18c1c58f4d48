use crate::error::TranslationError;
use crate::prompt::{build_prompt, extract_sql};
use crate::provider::LlmProvider;
use crate::training::{TrainingExample, TrainingStore};
use async_trait::async_trait;
use sqlgate_core::LlmBackend;
use std::time::Duration;

/// Natural-language-to-SQL capability.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Turn a question into one SQL statement. One backend round trip.
    async fn translate(&self, question: &str) -> Result<String, TranslationError>;

    /// Record an example that later prompts will use.
    async fn train(&self, example: TrainingExample) -> Result<(), TranslationError>;
}

/// [`Translator`] backed by a chat-completion provider.
#[derive(Debug)]
pub struct LlmTranslator {
    provider: LlmProvider,
    client: reqwest::Client,
    store: TrainingStore,
}

impl LlmTranslator {
    pub fn new(provider: LlmProvider, timeout: Duration) -> Result<Self, TranslationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslationError::Client(e.to_string()))?;

        Ok(Self {
            provider,
            client,
            store: TrainingStore::new(),
        })
    }

    pub fn from_backend(backend: &LlmBackend, timeout: Duration) -> Result<Self, TranslationError> {
        Self::new(LlmProvider::from(backend), timeout)
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub fn store(&self) -> &TrainingStore {
        &self.store
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, question: &str) -> Result<String, TranslationError> {
        let context = self.store.context().await;
        let prompt = build_prompt(&context, question);

        let reply = self.provider.complete(&self.client, &prompt).await?;
        let sql = extract_sql(&reply).ok_or(TranslationError::EmptyResponse)?;

        tracing::info!(backend = self.provider.name(), "Generated SQL");
        tracing::debug!(sql = %sql, "Generated SQL text");
        Ok(sql)
    }

    async fn train(&self, example: TrainingExample) -> Result<(), TranslationError> {
        let kind = example.kind();
        self.store.add(example).await?;
        let total = self.store.len().await;
        tracing::info!(kind = %kind, total, "Recorded training example");
        Ok(())
    }
}
