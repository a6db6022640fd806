use rusqlite::types::Value;

use crate::error::SqlAccessError;
use crate::types::RowValues;

/// Convert a rusqlite `Value` into a `RowValues`.
#[must_use]
pub fn sqlite_value_to_row_value(value: Value) -> RowValues {
    match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    }
}

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `rusqlite::Error` if the column cannot be read.
pub fn sqlite_extract_value_sync(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<RowValues, rusqlite::Error> {
    let value: Value = row.get(idx)?;
    Ok(sqlite_value_to_row_value(value))
}

/// Step through `rows`, buffering every row's values in column order.
///
/// A stepping error (constraint violation, interrupt, busy) is the statement failing and
/// comes back as `ExecutionFailed`. A column that steps fine but cannot be read stays a
/// driver error.
///
/// # Errors
///
/// * `ExecutionFailed` with the driver message when stepping fails
/// * `SqliteError` when a fetched value cannot be decoded
pub fn buffer_rows(
    mut rows: rusqlite::Rows<'_>,
    column_count: usize,
) -> Result<Vec<Vec<RowValues>>, SqlAccessError> {
    let mut buffered = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|e| SqlAccessError::ExecutionFailed(e.to_string()))?
    {
        let mut row_values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            row_values.push(sqlite_extract_value_sync(row, i)?);
        }
        buffered.push(row_values);
    }
    Ok(buffered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undecodable_text_is_a_driver_error() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT CAST(x'ff' AS TEXT) AS bad").unwrap();
        let err = buffer_rows(stmt.raw_query(), 1).unwrap_err();
        assert!(matches!(err, SqlAccessError::SqliteError(_)));
    }

    #[test]
    fn failed_step_is_an_execution_failure() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT abs(x) FROM (SELECT 1 AS x UNION ALL SELECT ?)")
            .unwrap();
        stmt.raw_bind_parameter(1, i64::MIN).unwrap();
        let err = buffer_rows(stmt.raw_query(), 1).unwrap_err();
        assert!(matches!(err, SqlAccessError::ExecutionFailed(msg) if msg.contains("overflow")));
    }
}
