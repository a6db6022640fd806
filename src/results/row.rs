use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::field_names::FieldNames;
use crate::types::RowValues;

/// The reusable per-statement slot vector rows are fetched into.
///
/// It is overwritten for every row; the only way for a caller to get at its contents
/// is [`Record::snapshot`], which copies them.
#[derive(Debug)]
pub(crate) struct FetchBuffer {
    slots: Vec<RowValues>,
}

impl FetchBuffer {
    pub(crate) fn new(width: usize) -> Self {
        Self {
            slots: vec![RowValues::Null; width],
        }
    }

    /// Move one fetched row into the slots, following the column → field mapping.
    pub(crate) fn load(&mut self, fields: &FieldNames, row: Vec<RowValues>) {
        for (column, value) in row.into_iter().enumerate() {
            if let Some(slot) = fields
                .slot_for_column(column)
                .and_then(|slot| self.slots.get_mut(slot))
            {
                *slot = value;
            }
        }
    }

    pub(crate) fn slots(&self) -> &[RowValues] {
        &self.slots
    }
}

/// One result row: the result's field names mapped to owned values.
///
/// Every record of a result shares the same [`FieldNames`] (read-only) but owns its values,
/// so changing one record never shows up in another.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Arc<FieldNames>,
    values: Vec<RowValues>,
}

impl Record {
    /// Copy the current buffer contents into a fresh record.
    pub(crate) fn snapshot(fields: &Arc<FieldNames>, buffer: &FetchBuffer) -> Self {
        Self {
            fields: Arc::clone(fields),
            values: buffer.slots().to_vec(),
        }
    }

    /// Build a record directly from values, one per field.
    ///
    /// Returns `None` when the value count does not match the field count.
    #[must_use]
    pub fn from_parts(fields: Arc<FieldNames>, values: Vec<RowValues>) -> Option<Self> {
        (fields.len() == values.len()).then_some(Self { fields, values })
    }

    #[must_use]
    pub fn field_names(&self) -> &FieldNames {
        &self.fields
    }

    /// Get a value from the record by field name
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&RowValues> {
        self.fields
            .get_index(field)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the record by field position
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut RowValues> {
        let idx = self.fields.get_index(field)?;
        self.values.get_mut(idx)
    }

    /// Replace the value of an existing field, returning the previous one.
    ///
    /// Unknown fields are ignored: the key set of a record never changes.
    pub fn set(&mut self, field: &str, value: RowValues) -> Option<RowValues> {
        self.get_mut(field)
            .map(|slot| std::mem::replace(slot, value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(field, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.fields.iter().zip(self.values.iter())
    }

    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<RowValues> {
        self.values
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}
