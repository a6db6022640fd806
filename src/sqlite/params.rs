use rusqlite::types::Value;

use crate::error::SqlAccessError;
use crate::types::{ParamConverter, ParameterValue};

/// Convert a single translated parameter to a rusqlite `Value`.
#[must_use]
pub fn parameter_to_sqlite_value(value: &ParameterValue) -> Value {
    match value {
        ParameterValue::Integer(i) => Value::Integer(*i),
        ParameterValue::Float(f) => Value::Real(*f),
        ParameterValue::Text(s) | ParameterValue::SerializedComposite(s) => Value::Text(s.clone()),
    }
}

/// Owned `SQLite` parameter vector.
///
/// A `BoundStatement` keeps this alive, unmoved, from bind until the statement is dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(pub Vec<Value>);

impl Params {
    /// Convert translated parameters into `SQLite` values.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` matches the `ParamConverter` contract.
    pub fn convert(params: &[ParameterValue]) -> Result<Self, SqlAccessError> {
        Ok(Params(params.iter().map(parameter_to_sqlite_value).collect()))
    }

    /// Borrow the underlying values.
    #[must_use]
    pub fn as_values(&self) -> &[Value] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ParamConverter<'_> for Params {
    type Converted = Params;

    fn convert_sql_params(params: &[ParameterValue]) -> Result<Self::Converted, SqlAccessError> {
        Self::convert(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composites_bind_as_text() {
        let params = Params::convert(&[
            ParameterValue::Integer(3),
            ParameterValue::Float(1.25),
            ParameterValue::Text("a".into()),
            ParameterValue::SerializedComposite("[1,2]".into()),
        ])
        .unwrap();
        assert_eq!(
            params.as_values(),
            &[
                Value::Integer(3),
                Value::Real(1.25),
                Value::Text("a".into()),
                Value::Text("[1,2]".into()),
            ]
        );
        assert_eq!(params.len(), 4);
    }
}
