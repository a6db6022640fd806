use std::time::Duration;

use crate::database::Database;
use crate::error::SqlAccessError;
use crate::types::ExecutionFailurePolicy;

/// Options for opening a `SQLite` session.
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteOptions {
    pub db_path: String,
    /// Text encoding applied to new databases (`utf8`, `utf16`, `utf16le`, `utf16be`)
    pub charset: Option<String>,
    /// Record every statement in a `QueryMonitor`
    pub monitor: bool,
    pub execution_failure: ExecutionFailurePolicy,
    /// Deadline for each statement; the running statement is interrupted when it expires
    pub statement_timeout: Option<Duration>,
    /// How long `SQLite` waits on a locked database before giving up
    pub busy_timeout: Option<Duration>,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            charset: None,
            monitor: false,
            execution_failure: ExecutionFailurePolicy::default(),
            statement_timeout: None,
            busy_timeout: None,
        }
    }

    #[must_use]
    pub fn with_monitor(mut self, monitor: bool) -> Self {
        self.monitor = monitor;
        self
    }

    #[must_use]
    pub fn with_execution_failure(mut self, policy: ExecutionFailurePolicy) -> Self {
        self.execution_failure = policy;
        self
    }

    /// The `PRAGMA encoding` value for the configured charset, if any.
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError::ConfigError` for a charset `SQLite` cannot store text in.
    pub fn sqlite_encoding(&self) -> Result<Option<&'static str>, SqlAccessError> {
        let Some(charset) = self.charset.as_deref() else {
            return Ok(None);
        };
        let encoding = match charset.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "utf8" | "utf8mb4" => "UTF-8",
            "utf16" => "UTF-16",
            "utf16le" => "UTF-16le",
            "utf16be" => "UTF-16be",
            _ => {
                return Err(SqlAccessError::ConfigError(format!(
                    "unsupported charset for SQLite: {charset}"
                )));
            }
        };
        Ok(Some(encoding))
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.opts.charset = Some(charset.into());
        self
    }

    #[must_use]
    pub fn monitor(mut self, monitor: bool) -> Self {
        self.opts.monitor = monitor;
        self
    }

    #[must_use]
    pub fn execution_failure(mut self, policy: ExecutionFailurePolicy) -> Self {
        self.opts.execution_failure = policy;
        self
    }

    #[must_use]
    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.opts.statement_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Open a connected `Database` session.
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError` if the options are invalid or the connection cannot be opened.
    pub async fn build(self) -> Result<Database, SqlAccessError> {
        Database::connect(self.finish()).await
    }
}

impl Database {
    #[must_use]
    pub fn sqlite_builder(db_path: String) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }
}
