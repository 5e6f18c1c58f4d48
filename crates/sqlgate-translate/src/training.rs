//! Training examples and their in-memory store.

use crate::error::TranslationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::RwLock;

/// Kind of a training example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingKind {
    Ddl,
    Documentation,
    QuestionSql,
}

impl TrainingKind {
    /// Identifier used in tool arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingKind::Ddl => "ddl",
            TrainingKind::Documentation => "documentation",
            TrainingKind::QuestionSql => "question_sql",
        }
    }

    /// Human-readable name used in confirmations.
    pub fn label(&self) -> &'static str {
        match self {
            TrainingKind::Ddl => "DDL",
            TrainingKind::Documentation => "documentation",
            TrainingKind::QuestionSql => "question-SQL pair",
        }
    }
}

impl fmt::Display for TrainingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of context for the translator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "training_type", rename_all = "snake_case")]
pub enum TrainingExample {
    /// A `CREATE TABLE` (or similar) statement.
    Ddl { ddl: String },
    /// Free-form business documentation.
    Documentation { documentation: String },
    /// A question and the SQL that answers it.
    QuestionSql { question: String, sql: String },
}

impl TrainingExample {
    pub fn kind(&self) -> TrainingKind {
        match self {
            TrainingExample::Ddl { .. } => TrainingKind::Ddl,
            TrainingExample::Documentation { .. } => TrainingKind::Documentation,
            TrainingExample::QuestionSql { .. } => TrainingKind::QuestionSql,
        }
    }

    /// Every text field must be non-blank.
    pub fn validate(&self) -> Result<(), TranslationError> {
        let blank = |s: &str| s.trim().is_empty();
        match self {
            TrainingExample::Ddl { ddl } if blank(ddl) => {
                Err(TranslationError::InvalidExample("ddl must not be empty".into()))
            }
            TrainingExample::Documentation { documentation } if blank(documentation) => Err(
                TranslationError::InvalidExample("documentation must not be empty".into()),
            ),
            TrainingExample::QuestionSql { question, .. } if blank(question) => Err(
                TranslationError::InvalidExample("question must not be empty".into()),
            ),
            TrainingExample::QuestionSql { sql, .. } if blank(sql) => {
                Err(TranslationError::InvalidExample("sql must not be empty".into()))
            }
            _ => Ok(()),
        }
    }
}

/// Snapshot of everything trained so far, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingContext {
    pub ddl: Vec<String>,
    pub documentation: Vec<String>,
    pub question_sql: Vec<(String, String)>,
}

impl TrainingContext {
    pub fn is_empty(&self) -> bool {
        self.ddl.is_empty() && self.documentation.is_empty() && self.question_sql.is_empty()
    }
}

/// Process-local store of training examples.
///
/// Examples live for the lifetime of the process; there is no persistence
/// and no similarity search, every example is offered to every prompt.
#[derive(Debug, Default)]
pub struct TrainingStore {
    examples: RwLock<Vec<TrainingExample>>,
}

impl TrainingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append an example.
    pub async fn add(&self, example: TrainingExample) -> Result<(), TranslationError> {
        example.validate()?;
        self.examples.write().await.push(example);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.examples.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.examples.read().await.is_empty()
    }

    pub async fn context(&self) -> TrainingContext {
        let examples = self.examples.read().await;
        let mut context = TrainingContext::default();
        for example in examples.iter() {
            match example {
                TrainingExample::Ddl { ddl } => context.ddl.push(ddl.clone()),
                TrainingExample::Documentation { documentation } => {
                    context.documentation.push(documentation.clone())
                }
                TrainingExample::QuestionSql { question, sql } => {
                    context.question_sql.push((question.clone(), sql.clone()))
                }
            }
        }
        context
    }
}
