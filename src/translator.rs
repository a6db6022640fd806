//! Classification of caller values into bind kinds.
//!
//! Every [`Param`] either maps to exactly one [`ParameterValue`] or is rejected here,
//! so nothing the driver cannot bind ever reaches a prepared statement.

use serde_json::Value as JsonValue;

use crate::error::SqlAccessError;
use crate::types::{Param, ParameterValue};

/// Translate one caller value into its bind kind.
///
/// | input                         | bind kind             |
/// |-------------------------------|-----------------------|
/// | `Bool`, `Int`, `UInt` ≤ i64   | `Integer`             |
/// | `Float`                       | `Float`               |
/// | `Text`                        | `Text` (unchanged)    |
/// | `Structured`                  | `SerializedComposite` |
///
/// # Errors
///
/// `SqlAccessError::UnsupportedParameterType` for `Null`, `Blob`, unsigned values
/// above `i64::MAX`, and structured values that are JSON `null`.
pub fn classify(value: &Param) -> Result<ParameterValue, SqlAccessError> {
    match value {
        Param::Bool(b) => Ok(ParameterValue::Integer(i64::from(*b))),
        Param::Int(i) => Ok(ParameterValue::Integer(*i)),
        Param::UInt(u) => i64::try_from(*u)
            .map(ParameterValue::Integer)
            .map_err(|_| SqlAccessError::unsupported(format!("uint {u} exceeds i64 range"))),
        Param::Float(f) => Ok(ParameterValue::Float(*f)),
        Param::Text(s) => Ok(ParameterValue::Text(s.clone())),
        Param::Structured(JsonValue::Null) => Err(SqlAccessError::unsupported("null")),
        Param::Structured(json) => Ok(ParameterValue::SerializedComposite(json.to_string())),
        Param::Null | Param::Blob(_) => Err(SqlAccessError::unsupported(value.kind())),
    }
}

/// Translate a parameter list in order, stopping at the first unsupported value.
///
/// # Errors
///
/// Propagates the first `classify` failure.
pub fn classify_all(values: &[Param]) -> Result<Vec<ParameterValue>, SqlAccessError> {
    values.iter().map(classify).collect()
}
