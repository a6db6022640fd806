use std::sync::Arc;

use crate::error::SqlAccessError;
use crate::executor::run_statement;
use crate::monitor::QueryMonitor;
use crate::results::{Record, ResultHandle, fetch_all, fetch_one};
use crate::sqlite::{SqliteConnection, SqliteOptions, escape_identifier, escape_literal};
use crate::types::{IntoParams, SortOrder};

/// A database session: one connection, one statement in flight at a time.
///
/// ```rust,no_run
/// use sql_access::prelude::*;
///
/// # async fn demo() -> Result<(), SqlAccessError> {
/// let mut db = Database::connect(SqliteOptions::new("app.db".into())).await?;
/// db.execute_batch("CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, name TEXT)")
///     .await?;
/// db.execute("INSERT INTO users (name) VALUES (?)", "alice").await?;
/// let id = db.last_insert_id().await?;
/// let user = db.get_object("SELECT * FROM users WHERE id = ?", id).await?;
/// assert!(user.is_some());
/// db.close().await?;
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Database {
    options: SqliteOptions,
    conn: Option<SqliteConnection>,
    monitor: Option<Arc<QueryMonitor>>,
}

impl Database {
    /// Create a session without connecting; the first statement connects.
    #[must_use]
    pub fn new(options: SqliteOptions) -> Self {
        let monitor = options.monitor.then(|| Arc::new(QueryMonitor::new()));
        Self {
            options,
            conn: None,
            monitor,
        }
    }

    /// Create a session and connect right away.
    ///
    /// # Errors
    ///
    /// `ConnectionFailed` or `ConfigError` from opening the connection.
    pub async fn connect(options: SqliteOptions) -> Result<Self, SqlAccessError> {
        let mut db = Self::new(options);
        db.connection().await?;
        Ok(db)
    }

    /// Log statements into `monitor`, which may be shared with other sessions.
    #[must_use]
    pub fn with_monitor(mut self, monitor: Arc<QueryMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    #[must_use]
    pub fn monitor(&self) -> Option<&Arc<QueryMonitor>> {
        self.monitor.as_ref()
    }

    #[must_use]
    pub fn options(&self) -> &SqliteOptions {
        &self.options
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Close the connection and log the monitor summary. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError` if the driver fails to close the handle.
    pub async fn close(&mut self) -> Result<(), SqlAccessError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        self.log_monitor_summary();
        conn.disconnect().await
    }

    /// Run `template` with `params` and return the buffered result.
    ///
    /// A single value is accepted where a list is expected and treated as a one-element list.
    ///
    /// # Errors
    ///
    /// * `ConnectionFailed` if no connection can be established
    /// * `PrepareFailed`, `UnsupportedParameterType`, `ParameterCountMismatch` from binding
    /// * `ExecutionFailed` under the strict failure policy
    /// * `Timeout` when a statement timeout is configured and expires
    pub async fn query(
        &mut self,
        template: &str,
        params: impl IntoParams,
    ) -> Result<ResultHandle, SqlAccessError> {
        let values = params.into_params();
        let policy = self.options.execution_failure;
        let deadline = self.options.statement_timeout;
        let monitor = self.monitor.clone();
        let sql = template.to_owned();
        tracing::debug!(query = template, params = values.len(), "dispatching query");

        let conn = self.connection().await?;
        conn.run(deadline, move |conn| {
            run_statement(conn, &sql, &values, policy, monitor.as_deref())
        })
        .await
    }

    /// Run a DML statement and return the number of rows it changed.
    ///
    /// # Errors
    ///
    /// Same as [`Database::query`].
    pub async fn execute(
        &mut self,
        template: &str,
        params: impl IntoParams,
    ) -> Result<usize, SqlAccessError> {
        Ok(self.query(template, params).await?.rows_affected())
    }

    /// Run a script of one or more statements without parameters (DDL, seeding).
    ///
    /// # Errors
    ///
    /// `ConnectionFailed` or the driver error for the failing statement.
    pub async fn execute_batch(&mut self, sql: &str) -> Result<(), SqlAccessError> {
        let sql_owned = sql.to_owned();
        let deadline = self.options.statement_timeout;
        self.connection()
            .await?
            .run(deadline, move |conn| {
                conn.execute_batch(&sql_owned)
                    .map_err(SqlAccessError::SqliteError)
            })
            .await
    }

    /// Whether `template` matches at least one row.
    ///
    /// # Errors
    ///
    /// Same as [`Database::query`].
    pub async fn object_exists(
        &mut self,
        template: &str,
        params: impl IntoParams,
    ) -> Result<bool, SqlAccessError> {
        let mut handle = self.query(template, params).await?;
        let exists = handle.num_rows() > 0;
        handle.close();
        Ok(exists)
    }

    /// First row of the result, or `None` when nothing matched.
    ///
    /// # Errors
    ///
    /// Same as [`Database::query`].
    pub async fn get_object(
        &mut self,
        template: &str,
        params: impl IntoParams,
    ) -> Result<Option<Record>, SqlAccessError> {
        Ok(fetch_one(self.query(template, params).await?))
    }

    /// Every row of the result; empty when nothing matched.
    ///
    /// # Errors
    ///
    /// Same as [`Database::query`].
    pub async fn get_objects(
        &mut self,
        template: &str,
        params: impl IntoParams,
    ) -> Result<Vec<Record>, SqlAccessError> {
        Ok(fetch_all(self.query(template, params).await?, None))
    }

    /// At most `limit` rows of the result.
    ///
    /// # Errors
    ///
    /// Same as [`Database::query`].
    pub async fn get_objects_limited(
        &mut self,
        template: &str,
        params: impl IntoParams,
        limit: usize,
    ) -> Result<Vec<Record>, SqlAccessError> {
        Ok(fetch_all(self.query(template, params).await?, Some(limit)))
    }

    /// All rows of `table`.
    ///
    /// # Errors
    ///
    /// Same as [`Database::query`].
    pub async fn get_table(&mut self, table: &str) -> Result<Vec<Record>, SqlAccessError> {
        let sql = format!("SELECT * FROM `{}`", escape_identifier(table));
        self.get_objects(&sql, ()).await
    }

    /// The first row of `table` whose `field` equals `value`.
    ///
    /// # Errors
    ///
    /// Same as [`Database::query`].
    pub async fn get_table_row(
        &mut self,
        table: &str,
        field: &str,
        value: impl IntoParams,
    ) -> Result<Option<Record>, SqlAccessError> {
        let sql = format!(
            "SELECT * FROM `{}` WHERE `{}` = ? LIMIT 1",
            escape_identifier(table),
            escape_identifier(field)
        );
        self.get_object(&sql, value).await
    }

    /// Rows of `table` whose `field` equals `value`, ordered by `sort_field`
    /// (defaults to `field`).
    ///
    /// # Errors
    ///
    /// Same as [`Database::query`].
    pub async fn get_table_rows(
        &mut self,
        table: &str,
        field: &str,
        value: impl IntoParams,
        sort_field: Option<&str>,
        order: SortOrder,
    ) -> Result<Vec<Record>, SqlAccessError> {
        let field = escape_identifier(field);
        let sort_field = sort_field.map_or_else(|| field.clone(), escape_identifier);
        let sql = format!(
            "SELECT * FROM `{}` WHERE `{field}` = ? ORDER BY `{sort_field}` {}",
            escape_identifier(table),
            order.as_sql()
        );
        self.get_objects(&sql, value).await
    }

    /// Row id of the most recent successful INSERT in this session.
    ///
    /// # Errors
    ///
    /// `ConnectionFailed` if no connection can be established.
    pub async fn last_insert_id(&mut self) -> Result<i64, SqlAccessError> {
        self.connection().await?.last_insert_id().await
    }

    #[must_use]
    pub fn escape_identifier(&self, text: &str) -> String {
        escape_identifier(text)
    }

    #[must_use]
    pub fn escape_literal(&self, text: &str) -> String {
        escape_literal(text)
    }

    /// The open connection, connecting once if there is none.
    async fn connection(&mut self) -> Result<&SqliteConnection, SqlAccessError> {
        if self.conn.is_none() {
            let conn = SqliteConnection::connect(&self.options).await?;
            self.conn = Some(conn);
        }
        self.conn
            .as_ref()
            .ok_or_else(|| SqlAccessError::ConnectionFailed("connection unavailable".into()))
    }

    fn log_monitor_summary(&self) {
        if let Some(monitor) = &self.monitor {
            tracing::info!(
                queries = monitor.count(),
                total_ms = monitor.total_ms(),
                "query monitor\n{}",
                monitor.report()
            );
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if self.conn.is_some() {
            self.log_monitor_summary();
        }
    }
}
