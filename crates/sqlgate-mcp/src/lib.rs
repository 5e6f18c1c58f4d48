//! # sqlgate-mcp
//!
//! MCP (Model Context Protocol) surface of the sqlgate gateway.
//!
//! Agents see five fixed tools. Each call is validated against the tool's
//! JSON schema, decoded into an [`Operation`] and handed to the
//! [`Dispatcher`], which talks to the database and the translator and always
//! answers with one [`OperationResult`].
//!
//! ## Architecture
//!
//! ```text
//! AI Agent (Claude, Cursor, ...)
//!       │
//!       │ MCP protocol (SSE or stdio)
//!       ▼
//! ┌──────────────────────┐
//! │  McpServer           │
//! │  1. Validate args    │  ← jsonschema
//! │  2. Decode Operation │
//! │  3. Dispatch         │──▶ Translator (NL → SQL)
//! │  4. Render text      │──▶ SqlExecutor ──▶ SSH tunnel ──▶ MySQL
//! └──────────────────────┘
//! ```
//!
//! ## Tools
//!
//! | Tool | Operation |
//! |------|-----------|
//! | `ask_database(question, auto_execute?)` | translate, then optionally execute |
//! | `train_vanna(training_type, ...)` | record DDL, documentation or a question/SQL pair |
//! | `get_tables()` | `SHOW TABLES` |
//! | `get_schema(table_name)` | `DESCRIBE <table_name>` |
//! | `execute_sql(sql)` | run the statement as given |

pub mod catalog;
pub mod dispatcher;
pub mod error;
pub mod http_transport;
pub mod operation;
pub mod protocol;
pub mod server;
pub mod tools;

#[cfg(test)]
mod testing;

pub use dispatcher::Dispatcher;
pub use error::McpError;
pub use operation::{Operation, OperationResult};
pub use protocol::{CallToolResponse, JsonRpcRequest, JsonRpcResponse, ToolDefinition};
pub use server::McpServer;
pub use tools::ToolRegistry;
