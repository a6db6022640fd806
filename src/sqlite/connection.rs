use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::InterruptHandle;
use tokio::sync::Mutex;

use super::config::SqliteOptions;
use crate::error::SqlAccessError;

/// The raw connection, shared with the blocking task that runs each statement.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// An open `SQLite` session.
///
/// Statements run one at a time: each call takes the connection lock inside
/// `spawn_blocking` and holds it until the result is buffered.
pub struct SqliteConnection {
    conn: SharedSqliteConnection,
    interrupt: InterruptHandle,
    db_path: String,
}

impl SqliteConnection {
    /// Open the database described by `options` and apply its charset and busy timeout.
    ///
    /// # Errors
    ///
    /// `ConnectionFailed` with the driver message when the database cannot be opened or
    /// configured; `ConfigError` for an unsupported charset.
    pub async fn connect(options: &SqliteOptions) -> Result<Self, SqlAccessError> {
        let encoding = options.sqlite_encoding()?;
        let db_path = options.db_path.clone();
        let busy_timeout = options.busy_timeout;

        let path = db_path.clone();
        let conn = tokio::task::spawn_blocking(move || open(&path, encoding, busy_timeout))
            .await
            .map_err(|e| {
                SqlAccessError::ConnectionFailed(format!("sqlite open join error: {e}"))
            })??;

        tracing::debug!(db_path = %db_path, "sqlite connection opened");
        Ok(Self {
            interrupt: conn.get_interrupt_handle(),
            conn: Arc::new(Mutex::new(conn)),
            db_path,
        })
    }

    /// Close the session, releasing the database handle.
    ///
    /// # Errors
    ///
    /// Returns `SqliteError` if `SQLite` refuses to close the handle.
    pub async fn disconnect(self) -> Result<(), SqlAccessError> {
        let db_path = self.db_path;
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex.into_inner();
                tokio::task::spawn_blocking(move || conn.close().map_err(|(_, e)| e))
                    .await
                    .map_err(|e| SqlAccessError::Other(format!("sqlite close join error: {e}")))??;
            }
            // A timed-out statement still owns a handle; the connection closes when it finishes
            Err(_) => tracing::debug!(db_path = %db_path, "sqlite connection still in use at close"),
        }
        tracing::debug!(db_path = %db_path, "sqlite connection closed");
        Ok(())
    }

    /// Run synchronous `rusqlite` work on the connection, off the async runtime.
    ///
    /// With a `deadline`, the running statement is interrupted once it expires.
    ///
    /// # Errors
    ///
    /// Whatever `func` returns, `Timeout` when the deadline expires, or `Other` if the
    /// blocking task panicked.
    pub async fn run<F, R>(&self, deadline: Option<Duration>, func: F) -> Result<R, SqlAccessError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlAccessError> + Send + 'static,
        R: Send + 'static,
    {
        let task = run_blocking(self.conn_handle(), func);
        let Some(limit) = deadline else {
            return task.await;
        };
        match tokio::time::timeout(limit, task).await {
            Ok(result) => result,
            Err(_) => {
                self.interrupt.interrupt();
                tracing::warn!(db_path = %self.db_path, ?limit, "statement deadline expired; interrupted");
                Err(SqlAccessError::Timeout(limit))
            }
        }
    }

    /// Row id of the most recent successful INSERT on this connection.
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError` if the blocking task fails.
    pub async fn last_insert_id(&self) -> Result<i64, SqlAccessError> {
        self.run(None, |conn| Ok(conn.last_insert_rowid())).await
    }

    #[must_use]
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Escape text for use inside a backtick-quoted identifier.
    #[must_use]
    pub fn escape_identifier(&self, text: &str) -> String {
        escape_identifier(text)
    }

    /// Escape text for use inside a single-quoted string literal.
    #[must_use]
    pub fn escape_literal(&self, text: &str) -> String {
        escape_literal(text)
    }

    fn conn_handle(&self) -> SharedSqliteConnection {
        Arc::clone(&self.conn)
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

fn open(
    path: &str,
    encoding: Option<&'static str>,
    busy_timeout: Option<Duration>,
) -> Result<rusqlite::Connection, SqlAccessError> {
    let failed = |e: rusqlite::Error| SqlAccessError::ConnectionFailed(format!("{path}: {e}"));
    let conn = rusqlite::Connection::open(path).map_err(failed)?;
    if let Some(encoding) = encoding {
        // Only takes effect before the database file has content
        conn.execute_batch(&format!("PRAGMA encoding = '{encoding}';"))
            .map_err(failed)?;
    }
    if let Some(timeout) = busy_timeout {
        conn.busy_timeout(timeout).map_err(failed)?;
    }
    Ok(conn)
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, SqlAccessError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlAccessError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| SqlAccessError::Other(format!("sqlite spawn_blocking join error: {e}")))?
}

/// Double backticks and drop NUL bytes so `text` is safe between backticks.
#[must_use]
pub fn escape_identifier(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\0')
        .flat_map(|c| {
            let repeat = if c == '`' { 2 } else { 1 };
            std::iter::repeat_n(c, repeat)
        })
        .collect()
}

/// Double single quotes and drop NUL bytes so `text` is safe between single quotes.
#[must_use]
pub fn escape_literal(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\0')
        .flat_map(|c| {
            let repeat = if c == '\'' { 2 } else { 1 };
            std::iter::repeat_n(c, repeat)
        })
        .collect()
}
