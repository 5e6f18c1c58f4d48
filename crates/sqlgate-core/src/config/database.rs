//! Database credentials.
//!
//! Host and port are not configured here: connections always go to the
//! loopback end of the tunnel.

use crate::error::ConfigError;
use std::fmt;

/// MySQL login used for every connection made through the tunnel.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DatabaseCredentials {
    /// MySQL user.
    pub user: String,

    /// MySQL password.
    pub password: String,

    /// Default schema for the connection.
    pub database: String,
}

impl DatabaseCredentials {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// All three fields must be non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user.is_empty() {
            return Err(ConfigError::Missing("MYSQL_USER"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Missing("MYSQL_PASSWORD"));
        }
        if self.database.is_empty() {
            return Err(ConfigError::Missing("MYSQL_DATABASE"));
        }
        Ok(())
    }
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}
