//! Template + values → a prepared, fully bound statement.

use rusqlite::Connection;

use crate::error::SqlAccessError;
use crate::sqlite::params::Params;
use crate::translator::classify_all;
use crate::types::{Param, ParamConverter, ParameterValue};

/// A prepared statement with every placeholder bound.
///
/// The translated values and their driver form live here, unmoved, until the statement
/// is dropped; dropping finalizes the prepared statement on every path.
#[derive(Debug)]
pub struct BoundStatement<'conn> {
    conn: &'conn Connection,
    template: String,
    values: Vec<ParameterValue>,
    params: Params,
    stmt: rusqlite::Statement<'conn>,
}

impl<'conn> BoundStatement<'conn> {
    /// Prepare `template`, translate `values`, and bind them in order.
    ///
    /// # Errors
    ///
    /// * `PrepareFailed` for an empty template or a driver prepare failure
    /// * `UnsupportedParameterType` for a value with no bind kind
    /// * `ParameterCountMismatch` when the placeholder count differs from the value count
    /// * `SqliteError` if the driver rejects a bind call
    pub fn bind(
        conn: &'conn Connection,
        template: &str,
        values: &[Param],
    ) -> Result<Self, SqlAccessError> {
        if template.trim().is_empty() {
            return Err(SqlAccessError::PrepareFailed("empty query template".into()));
        }
        let mut stmt = conn
            .prepare(template)
            .map_err(|e| SqlAccessError::PrepareFailed(e.to_string()))?;

        let translated = classify_all(values)?;
        let expected = stmt.parameter_count();
        if expected != translated.len() {
            return Err(SqlAccessError::ParameterCountMismatch {
                expected,
                actual: translated.len(),
            });
        }

        let params = <Params as ParamConverter<'_>>::convert_sql_params(&translated)?;
        for (idx, value) in params.as_values().iter().enumerate() {
            stmt.raw_bind_parameter(idx + 1, value)?;
        }
        tracing::trace!(
            kinds = ?translated.iter().map(ParameterValue::tag).collect::<Vec<_>>(),
            "bound statement parameters"
        );

        Ok(Self {
            conn,
            template: template.to_owned(),
            values: translated,
            params,
            stmt,
        })
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The translated values, in placeholder order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterValue] {
        &self.values
    }

    /// Result column names as reported by the prepared statement (duplicates included).
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.stmt
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.stmt.column_count()
    }

    pub(crate) fn connection(&self) -> &'conn Connection {
        self.conn
    }

    pub(crate) fn statement_mut(&mut self) -> &mut rusqlite::Statement<'conn> {
        &mut self.stmt
    }

    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}
