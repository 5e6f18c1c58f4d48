//! # sqlgate-db
//!
//! SQL execution against the MySQL server behind the tunnel.
//!
//! - [`SqlExecutor`]: the seam the dispatcher and translator depend on
//! - [`MySqlExecutor`]: one connection per call to the tunnel's loopback port
//! - [`StatementKind`]: prefix classification of read vs. mutating statements
//! - [`QueryResult`] / [`Table`]: outcomes and their text rendering

pub mod error;
pub mod executor;
pub mod mysql;
pub mod result;
pub mod statement;

pub use error::DatabaseError;
pub use executor::SqlExecutor;
pub use mysql::MySqlExecutor;
pub use result::{QueryResult, Table, render_cell};
pub use statement::StatementKind;
