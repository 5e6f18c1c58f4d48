use crate::error::DatabaseError;
use crate::result::QueryResult;
use async_trait::async_trait;

#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Run one statement and report its outcome.
    ///
    /// Read statements (see [`crate::StatementKind`]) return a table; anything
    /// else is committed and reports affected rows. Whatever happens, the
    /// connection used for the call is released before this returns.
    async fn execute(&self, sql: &str) -> Result<QueryResult, DatabaseError>;
}
