use std::collections::VecDeque;
use std::sync::Arc;

use super::field_names::FieldNames;
use super::row::{FetchBuffer, Record};
use crate::types::RowValues;

/// A fully buffered statement result.
///
/// Rows are handed out one at a time as independent [`Record`]s. The sequence is finite
/// and cannot be restarted. The handle is closed after draining, by
/// [`ResultHandle::close`], or when dropped.
#[derive(Debug)]
pub struct ResultHandle {
    fields: Arc<FieldNames>,
    pending: VecDeque<Vec<RowValues>>,
    buffer: FetchBuffer,
    num_rows: usize,
    rows_affected: usize,
    execution_error: Option<String>,
    closed: bool,
}

impl ResultHandle {
    pub(crate) fn buffered(
        fields: FieldNames,
        rows: Vec<Vec<RowValues>>,
        rows_affected: usize,
    ) -> Self {
        let buffer = FetchBuffer::new(fields.len());
        Self {
            num_rows: rows.len(),
            fields: Arc::new(fields),
            pending: rows.into(),
            buffer,
            rows_affected,
            execution_error: None,
            closed: false,
        }
    }

    /// A result with no rows standing in for a failed execution.
    pub(crate) fn failed(fields: FieldNames, error: String) -> Self {
        let mut handle = Self::buffered(fields, Vec::new(), 0);
        handle.execution_error = Some(error);
        handle
    }

    /// Field names of this result, in column order.
    #[must_use]
    pub fn field_names(&self) -> &FieldNames {
        &self.fields
    }

    /// Total number of rows the statement produced.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Rows not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Rows changed by an INSERT/UPDATE/DELETE; zero for row-returning statements.
    #[must_use]
    pub fn rows_affected(&self) -> usize {
        self.rows_affected
    }

    /// The driver message when execution failed and was reported as an empty result.
    #[must_use]
    pub fn execution_error(&self) -> Option<&str> {
        self.execution_error.as_deref()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Fetch the next row into the shared buffer and return a copy of it.
    pub fn next_row(&mut self) -> Option<Record> {
        if self.closed {
            return None;
        }
        let Some(row) = self.pending.pop_front() else {
            self.close();
            return None;
        };
        self.buffer.load(&self.fields, row);
        Some(Record::snapshot(&self.fields, &self.buffer))
    }

    /// Release the buffered rows. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.closed {
            self.pending.clear();
            self.closed = true;
            tracing::trace!(rows = self.num_rows, "result handle closed");
        }
    }
}

impl Iterator for ResultHandle {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.next_row()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.closed { 0 } else { self.pending.len() };
        (remaining, Some(remaining))
    }
}

impl Drop for ResultHandle {
    fn drop(&mut self) {
        self.close();
    }
}
