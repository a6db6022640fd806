//! Running bound statements and buffering their results.

use std::time::Instant;

use rusqlite::Connection;

use crate::error::SqlAccessError;
use crate::monitor::QueryMonitor;
use crate::results::{FieldNames, ResultHandle};
use crate::sqlite::query::buffer_rows;
use crate::statement::BoundStatement;
use crate::types::{ExecutionFailurePolicy, Param};

/// Execute a bound statement and buffer its whole result.
///
/// Field names are derived here, once, from the statement's column metadata.
/// A driver failure while stepping is an execution failure: under
/// [`ExecutionFailurePolicy::EmptyResult`] it becomes a handle with no rows whose
/// `execution_error` carries the driver message.
///
/// A value that was fetched but cannot be decoded is not an execution failure and is
/// returned as is, whatever the policy.
///
/// # Errors
///
/// * `ExecutionFailed` when execution fails under [`ExecutionFailurePolicy::Strict`]
/// * `SqliteError` when a fetched value cannot be read
pub fn execute(
    mut stmt: BoundStatement<'_>,
    policy: ExecutionFailurePolicy,
) -> Result<ResultHandle, SqlAccessError> {
    let fields = FieldNames::from_columns(stmt.column_names());
    let column_count = fields.column_count();
    let conn = stmt.connection();
    let changes_before = conn.total_changes();

    let outcome = buffer_rows(stmt.statement_mut().raw_query(), column_count);
    match outcome {
        Ok(rows) => {
            // `changes()` is stale after DDL; only read it when this statement changed rows
            let rows_affected = if column_count == 0 && conn.total_changes() != changes_before {
                usize::try_from(conn.changes()).unwrap_or(usize::MAX)
            } else {
                0
            };
            Ok(ResultHandle::buffered(fields, rows, rows_affected))
        }
        Err(SqlAccessError::ExecutionFailed(message)) => match policy {
            ExecutionFailurePolicy::Strict => Err(SqlAccessError::ExecutionFailed(message)),
            ExecutionFailurePolicy::EmptyResult => {
                tracing::warn!(
                    query = stmt.template(),
                    error = %message,
                    "statement execution failed; reporting empty result"
                );
                Ok(ResultHandle::failed(fields, message))
            }
        },
        Err(err) => Err(err),
    }
}

/// Bind and execute `template` on `conn`: the full prepare → bind → execute → buffer path.
///
/// When `monitor` is given, the statement is timed and logged once it has been bound;
/// without one nothing is timed.
///
/// # Errors
///
/// Any error from [`BoundStatement::bind`] or [`execute`].
pub fn run_statement(
    conn: &Connection,
    template: &str,
    values: &[Param],
    policy: ExecutionFailurePolicy,
    monitor: Option<&QueryMonitor>,
) -> Result<ResultHandle, SqlAccessError> {
    let started = monitor.map(|_| Instant::now());
    let stmt = BoundStatement::bind(conn, template, values)?;
    let result = execute(stmt, policy);
    if let (Some(monitor), Some(started)) = (monitor, started) {
        monitor.record(template, started.elapsed());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::fetch_all;
    use crate::types::RowValues;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             INSERT INTO t VALUES (5, 'a'), (6, 'b');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn select_buffers_all_rows() {
        let conn = conn();
        let handle = run_statement(
            &conn,
            "SELECT * FROM t ORDER BY id",
            &[],
            ExecutionFailurePolicy::EmptyResult,
            None,
        )
        .unwrap();
        assert_eq!(handle.num_rows(), 2);
        assert_eq!(handle.field_names().as_slice(), &["id", "name"]);
        let rows = fetch_all(handle, None);
        assert_eq!(rows[1].get("name").and_then(RowValues::as_text), Some("b"));
    }

    #[test]
    fn dml_reports_rows_affected() {
        let conn = conn();
        let handle = run_statement(
            &conn,
            "UPDATE t SET name = ? WHERE id >= ?",
            &[Param::Text("z".into()), Param::Int(5)],
            ExecutionFailurePolicy::EmptyResult,
            None,
        )
        .unwrap();
        assert_eq!(handle.rows_affected(), 2);
        assert_eq!(handle.num_rows(), 0);
        assert!(handle.field_names().is_empty());
    }

    #[test]
    fn failed_execution_degrades_to_empty_result() {
        let conn = conn();
        let handle = run_statement(
            &conn,
            "INSERT INTO t (id, name) VALUES (?, ?)",
            &[Param::Int(5), Param::Text("dup".into())],
            ExecutionFailurePolicy::EmptyResult,
            None,
        )
        .unwrap();
        assert_eq!(handle.num_rows(), 0);
        assert!(handle.execution_error().unwrap().contains("UNIQUE"));
    }

    #[test]
    fn strict_policy_surfaces_execution_failure() {
        let conn = conn();
        let err = run_statement(
            &conn,
            "INSERT INTO t (id, name) VALUES (?, ?)",
            &[Param::Int(5), Param::Text("dup".into())],
            ExecutionFailurePolicy::Strict,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SqlAccessError::ExecutionFailed(_)));
    }

    #[test]
    fn ddl_does_not_repeat_previous_change_count() {
        let conn = conn();
        let update = run_statement(
            &conn,
            "UPDATE t SET name = 'x'",
            &[],
            ExecutionFailurePolicy::EmptyResult,
            None,
        )
        .unwrap();
        assert_eq!(update.rows_affected(), 2);
        let ddl = run_statement(
            &conn,
            "CREATE TABLE other (v INTEGER)",
            &[],
            ExecutionFailurePolicy::EmptyResult,
            None,
        )
        .unwrap();
        assert_eq!(ddl.rows_affected(), 0);
    }

    #[test]
    fn unreadable_value_is_an_error_under_either_policy() {
        let conn = conn();
        for policy in [ExecutionFailurePolicy::EmptyResult, ExecutionFailurePolicy::Strict] {
            let err = run_statement(&conn, "SELECT CAST(x'ff' AS TEXT) AS bad", &[], policy, None)
                .unwrap_err();
            assert!(matches!(err, SqlAccessError::SqliteError(_)));
        }
    }

    #[test]
    fn monitor_records_bound_statements_only() {
        let conn = conn();
        let monitor = QueryMonitor::new();
        run_statement(
            &conn,
            "SELECT * FROM t WHERE id = ?",
            &[Param::Int(5)],
            ExecutionFailurePolicy::EmptyResult,
            Some(&monitor),
        )
        .unwrap();
        let _ = run_statement(
            &conn,
            "SELECT * FROM nowhere",
            &[],
            ExecutionFailurePolicy::EmptyResult,
            Some(&monitor),
        );
        let entries = monitor.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query, "SELECT * FROM t WHERE id = ?");
    }
}
