use std::collections::HashMap;

/// Ordered, duplicate-free field names of a result, derived once from column metadata.
///
/// Columns sharing a name collapse onto the position of the first occurrence; the value
/// fetched last for that name wins, the way an associative array would behave.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldNames {
    names: Vec<String>,
    // Internal cache for faster name lookups
    index: HashMap<String, usize>,
    // Field slot for every result column, in column order
    column_slots: Vec<usize>,
}

impl FieldNames {
    /// Build the field set from result column names, preserving column order.
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        let mut index = HashMap::new();
        let mut column_slots = Vec::new();
        for column in columns {
            let column = column.as_ref();
            let slot = *index.entry(column.to_owned()).or_insert_with(|| {
                names.push(column.to_owned());
                names.len() - 1
            });
            column_slots.push(slot);
        }
        Self {
            names,
            index,
            column_slots,
        }
    }

    /// Number of distinct fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of result columns the names were derived from (duplicates included).
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_slots.len()
    }

    #[must_use]
    pub fn get_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub(crate) fn slot_for_column(&self, column: usize) -> Option<usize> {
        self.column_slots.get(column).copied()
    }
}
