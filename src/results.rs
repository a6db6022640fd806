//! Row materialization: field names, per-row records, and the buffered result handle.

mod field_names;
mod result_set;
mod row;

pub use field_names::FieldNames;
pub use result_set::ResultHandle;
pub use row::Record;

/// Take at most one row from `handle`, then close it.
///
/// Returns `None` when the result has no rows.
#[must_use]
pub fn fetch_one(mut handle: ResultHandle) -> Option<Record> {
    let record = handle.next_row();
    handle.close();
    record
}

/// Drain `handle` (up to `limit` rows when given), then close it.
#[must_use]
pub fn fetch_all(mut handle: ResultHandle, limit: Option<usize>) -> Vec<Record> {
    let wanted = limit.map_or(handle.remaining(), |l| l.min(handle.remaining()));
    let mut records = Vec::with_capacity(wanted);
    while records.len() < wanted {
        match handle.next_row() {
            Some(record) => records.push(record),
            None => break,
        }
    }
    handle.close();
    records
}
