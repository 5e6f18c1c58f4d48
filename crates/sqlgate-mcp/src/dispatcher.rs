//! Routes operations to the database and translator.
//!
//! The dispatcher is stateless: it borrows the shared executor and translator
//! for each call and always answers with exactly one [`OperationResult`].

use crate::operation::{Operation, OperationResult};
use futures::FutureExt;
use sqlgate_db::{QueryResult, SqlExecutor};
use sqlgate_translate::{TrainingExample, Translator};
use std::fmt::Write as _;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Statement behind `get_tables`.
pub const LIST_TABLES_SQL: &str = "SHOW TABLES";

/// Statement behind `get_schema`. The table name is inserted verbatim.
pub fn describe_sql(table_name: &str) -> String {
    format!("DESCRIBE {}", table_name)
}

/// Operation dispatcher.
#[derive(Clone)]
pub struct Dispatcher {
    db: Arc<dyn SqlExecutor>,
    translator: Arc<dyn Translator>,
}

impl Dispatcher {
    pub fn new(db: Arc<dyn SqlExecutor>, translator: Arc<dyn Translator>) -> Self {
        Self { db, translator }
    }

    /// Run one operation.
    ///
    /// Never fails and never unwinds: downstream errors and panics become
    /// [`OperationResult::Err`].
    pub async fn dispatch(&self, op: Operation) -> OperationResult {
        let label = op.label();
        tracing::debug!(operation = label, "Dispatching operation");

        let result = match AssertUnwindSafe(self.run(op)).catch_unwind().await {
            Ok(Ok(text)) => OperationResult::ok(text),
            Ok(Err(message)) => OperationResult::err(message),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(operation = label, panic = %message, "Operation panicked");
                OperationResult::err(format!("internal error: {}", message))
            }
        };

        if let OperationResult::Err { message } = &result {
            tracing::warn!(operation = label, error = %message, "Operation failed");
        }
        result
    }

    async fn run(&self, op: Operation) -> Result<String, String> {
        match op {
            Operation::Ask {
                question,
                auto_execute,
            } => self.ask(&question, auto_execute).await,
            Operation::Train(example) => self.train(example).await,
            Operation::ListTables => {
                let result = self.execute(LIST_TABLES_SQL).await?;
                Ok(format!("Tables in database:\n{}", render_result(&result)))
            }
            Operation::DescribeSchema { table_name } => {
                let result = self.execute(&describe_sql(&table_name)).await?;
                Ok(format!(
                    "Schema for table '{}':\n{}",
                    table_name,
                    render_result(&result)
                ))
            }
            Operation::Execute { sql } => {
                let result = self.execute(&sql).await?;
                Ok(match &result {
                    QueryResult::Table(table) => format!(
                        "Query executed successfully.\n\nResults:\n{}\n\nTotal rows: {}",
                        table.render(),
                        table.row_count()
                    ),
                    QueryResult::Affected { .. } => render_result(&result),
                })
            }
        }
    }

    async fn ask(&self, question: &str, auto_execute: bool) -> Result<String, String> {
        let sql = self
            .translator
            .translate(question)
            .await
            .map_err(|e| e.to_string())?;

        let mut text = format!(
            "Question: {}\n\nGenerated SQL:\n```sql\n{}\n```\n\n",
            question, sql
        );

        if !auto_execute {
            text.push_str("SQL generated but not executed (auto_execute=false)");
            return Ok(text);
        }

        let result = self.execute(&sql).await?;
        match &result {
            QueryResult::Table(table) => {
                let _ = write!(
                    text,
                    "Results:\n{}\n\nTotal rows: {}",
                    table.render(),
                    table.row_count()
                );
            }
            QueryResult::Affected { .. } => {
                let _ = write!(text, "Results:\n{}", render_result(&result));
            }
        }
        Ok(text)
    }

    async fn train(&self, example: TrainingExample) -> Result<String, String> {
        let kind = example.kind();
        self.translator
            .train(example)
            .await
            .map_err(|e| e.to_string())?;
        Ok(format!("Successfully trained on {}", kind.label()))
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult, String> {
        self.db.execute(sql).await.map_err(|e| e.to_string())
    }
}

fn render_result(result: &QueryResult) -> String {
    match result {
        QueryResult::Table(table) => table.render(),
        QueryResult::Affected { rows_affected } => {
            format!("Query executed successfully. Rows affected: {}", rows_affected)
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
