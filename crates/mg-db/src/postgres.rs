//! Postgres database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use postgres::{Client, NoTls};
use std::time::Duration;

/// Upper bound for the liveness check in [`Database::validate`].
const VALIDATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Where and as whom to connect.
#[derive(Debug, Clone, Default)]
pub struct ConnectionSettings {
    /// libpq URL, key/value string, or `jdbc:postgresql://...`
    pub connection: String,
    /// Overrides the user in `connection` when non-empty
    pub user: String,
    /// Overrides the password in `connection` when non-empty
    pub password: String,
}

impl ConnectionSettings {
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Build a driver config from the settings.
    pub fn to_config(&self) -> DbResult<postgres::Config> {
        let connection = normalize_connection_string(&self.connection);
        let mut config: postgres::Config =
            connection
                .parse()
                .map_err(|e: postgres::Error| DbError::InvalidConnectionString {
                    connection: redact(connection),
                    message: e.to_string(),
                })?;
        if !self.user.is_empty() {
            config.user(&self.user);
        }
        if !self.password.is_empty() {
            config.password(&self.password);
        }
        Ok(config)
    }

    /// Connection target without credentials, for log lines
    pub fn display_target(&self) -> String {
        redact(normalize_connection_string(&self.connection))
    }
}

/// Strip a JDBC prefix so `jdbc:postgresql://host/db` parses as a libpq URL.
pub fn normalize_connection_string(connection: &str) -> &str {
    let trimmed = connection.trim();
    trimmed.strip_prefix("jdbc:").unwrap_or(trimmed)
}

/// Remove `user:password@` from URL-style connection strings.
fn redact(connection: &str) -> String {
    let Some(scheme_end) = connection.find("://") else {
        return connection.to_string();
    };
    let rest = &connection[scheme_end + 3..];
    match rest.find('@') {
        Some(at) if !rest[..at].contains('/') => {
            format!("{}{}", &connection[..scheme_end + 3], &rest[at + 1..])
        }
        _ => connection.to_string(),
    }
}

/// Postgres database backend
pub struct PostgresBackend {
    client: Client,
}

impl PostgresBackend {
    /// Open a new connection without TLS
    pub fn connect(settings: &ConnectionSettings) -> DbResult<Self> {
        let config = settings.to_config()?;
        log::debug!("Connecting to {}", settings.display_target());
        let client = config
            .connect(NoTls)
            .map_err(|e| DbError::ConnectionError(format!("{}: {e}", settings.display_target())))?;
        Ok(Self { client })
    }
}

impl Database for PostgresBackend {
    fn db_type(&self) -> &'static str {
        "postgres"
    }

    fn validate(&mut self) -> DbResult<()> {
        self.client
            .is_valid(VALIDATE_TIMEOUT)
            .map_err(|e| DbError::ConnectionError(e.to_string()))
    }

    fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        self.client.batch_execute(sql).map_err(DbError::from)
    }

    fn query_i32_column(&mut self, sql: &str) -> DbResult<Vec<i32>> {
        let rows = self.client.query(sql, &[])?;
        rows.iter()
            .map(|row| {
                row.try_get::<_, i32>(0)
                    .map_err(|e| DbError::UnexpectedResult {
                        sql: sql.to_string(),
                        message: e.to_string(),
                    })
            })
            .collect()
    }

    fn query_bool(&mut self, sql: &str) -> DbResult<bool> {
        let row = self.client.query_one(sql, &[])?;
        row.try_get::<_, bool>(0)
            .map_err(|e| DbError::UnexpectedResult {
                sql: sql.to_string(),
                message: e.to_string(),
            })
    }

    fn close(self) -> DbResult<()> {
        self.client.close().map_err(DbError::from)
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
