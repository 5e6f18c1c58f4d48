//! Recording stand-ins for the database and translator.

use async_trait::async_trait;
use serde_json::Value;
use sqlgate_db::{DatabaseError, QueryResult, SqlExecutor, Table};
use sqlgate_translate::{TrainingExample, TranslationError, Translator};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Answers configured statements; anything else fails like a bad query.
#[derive(Clone, Default)]
pub(crate) struct StubExecutor {
    results: Arc<Mutex<HashMap<String, QueryResult>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubExecutor {
    pub(crate) fn with_table(self, sql: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let table = Table::new(columns.iter().map(|c| c.to_string()).collect(), rows);
        self.results
            .lock()
            .unwrap()
            .insert(sql.to_string(), QueryResult::Table(table));
        self
    }

    pub(crate) fn with_affected(self, sql: &str, rows_affected: u64) -> Self {
        self.results
            .lock()
            .unwrap()
            .insert(sql.to_string(), QueryResult::Affected { rows_affected });
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlExecutor for StubExecutor {
    async fn execute(&self, sql: &str) -> Result<QueryResult, DatabaseError> {
        self.calls.lock().unwrap().push(sql.to_string());
        self.results
            .lock()
            .unwrap()
            .get(sql)
            .cloned()
            .ok_or(DatabaseError::EmptyStatement)
    }
}

/// Translates configured questions; records training examples.
#[derive(Clone, Default)]
pub(crate) struct StubTranslator {
    answers: Arc<Mutex<HashMap<String, String>>>,
    trained: Arc<Mutex<Vec<TrainingExample>>>,
}

impl StubTranslator {
    pub(crate) fn with_answer(self, question: &str, sql: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(question.to_string(), sql.to_string());
        self
    }

    pub(crate) fn trained(&self) -> Vec<TrainingExample> {
        self.trained.lock().unwrap().clone()
    }
}

#[async_trait]
impl Translator for StubTranslator {
    async fn translate(&self, question: &str) -> Result<String, TranslationError> {
        self.answers
            .lock()
            .unwrap()
            .get(question)
            .cloned()
            .ok_or(TranslationError::EmptyResponse)
    }

    async fn train(&self, example: TrainingExample) -> Result<(), TranslationError> {
        example.validate()?;
        self.trained.lock().unwrap().push(example);
        Ok(())
    }
}
