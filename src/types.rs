use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::SqlAccessError;

/// A caller-supplied query parameter, before it is translated into a bind kind.
///
/// The set is deliberately wider than what the database accepts: `Null` and `Blob`
/// can be expressed here but are rejected by [`crate::translator::classify`].
/// Build values with `From`/`Into` or the [`params!`](crate::params) macro:
/// ```rust
/// use sql_access::prelude::*;
/// use serde_json::json;
///
/// let params = params![5, "alice", 2.5, json!({"x": 1})];
/// assert_eq!(params[0], Param::Int(5));
/// assert_eq!(params[1], Param::Text("alice".into()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Absence of a value
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned value; only representable when it fits in `i64`
    UInt(u64),
    Float(f64),
    Text(String),
    /// Ordered sequence, mapping, or nested composite
    Structured(JsonValue),
    /// Opaque binary handle
    Blob(Vec<u8>),
}

impl Param {
    /// Build a parameter from anything `serde` can serialize.
    ///
    /// Scalars land on their scalar variant, sequences and maps become [`Param::Structured`].
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError::UnsupportedParameterType` when serialization fails
    /// (e.g. a map with non-string keys).
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self, SqlAccessError> {
        let json = serde_json::to_value(value)
            .map_err(|e| SqlAccessError::unsupported(format!("unserializable value ({e})")))?;
        Ok(Param::from(json))
    }

    /// Short name of the runtime kind, used in error messages and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Param::Null => "null",
            Param::Bool(_) => "bool",
            Param::Int(_) => "int",
            Param::UInt(_) => "uint",
            Param::Float(_) => "float",
            Param::Text(_) => "text",
            Param::Structured(_) => "structured",
            Param::Blob(_) => "blob",
        }
    }
}

impl From<JsonValue> for Param {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Param::Null,
            JsonValue::Bool(b) => Param::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Param::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Param::UInt(u)
                } else if let Some(f) = n.as_f64() {
                    Param::Float(f)
                } else {
                    Param::Structured(JsonValue::Number(n))
                }
            }
            JsonValue::String(s) => Param::Text(s),
            composite @ (JsonValue::Array(_) | JsonValue::Object(_)) => Param::Structured(composite),
        }
    }
}

impl From<&JsonValue> for Param {
    fn from(value: &JsonValue) -> Self {
        Param::from(value.clone())
    }
}

macro_rules! param_from_lossless_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Param {
            fn from(value: $t) -> Self {
                Param::Int(i64::from(value))
            }
        })*
    };
}

param_from_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<isize> for Param {
    #[allow(clippy::cast_possible_truncation)]
    fn from(value: isize) -> Self {
        Param::Int(value as i64)
    }
}

impl From<u64> for Param {
    fn from(value: u64) -> Self {
        Param::UInt(value)
    }
}

impl From<usize> for Param {
    fn from(value: usize) -> Self {
        Param::UInt(value as u64)
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<f32> for Param {
    fn from(value: f32) -> Self {
        Param::Float(f64::from(value))
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_owned())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<&String> for Param {
    fn from(value: &String) -> Self {
        Param::Text(value.clone())
    }
}

/// Timestamps bind as `YYYY-MM-DD HH:MM:SS[.fff]` text, which `RowValues::as_timestamp` reads back.
impl From<NaiveDateTime> for Param {
    fn from(value: NaiveDateTime) -> Self {
        Param::Text(value.format("%F %T%.f").to_string())
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}

/// Anything accepted where a parameter list is expected.
///
/// Sequences (`Vec`, arrays, slices, a JSON array) are the list itself. A single
/// non-sequence value is promoted to a one-element list; its type is not changed.
/// ```rust
/// use sql_access::prelude::*;
///
/// assert_eq!(5_i64.into_params(), vec![Param::Int(5)]);
/// assert_eq!(vec![5_i64].into_params(), 5_i64.into_params());
/// assert!(().into_params().is_empty());
/// ```
pub trait IntoParams {
    fn into_params(self) -> Vec<Param>;
}

impl IntoParams for () {
    fn into_params(self) -> Vec<Param> {
        Vec::new()
    }
}

impl IntoParams for Param {
    fn into_params(self) -> Vec<Param> {
        vec![self]
    }
}

impl<T: Into<Param>> IntoParams for Vec<T> {
    fn into_params(self) -> Vec<Param> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Param>, const N: usize> IntoParams for [T; N] {
    fn into_params(self) -> Vec<Param> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Param> + Clone> IntoParams for &[T] {
    fn into_params(self) -> Vec<Param> {
        self.iter().cloned().map(Into::into).collect()
    }
}

impl<T: Into<Param>> IntoParams for Option<T> {
    fn into_params(self) -> Vec<Param> {
        vec![Param::from(self)]
    }
}

impl IntoParams for JsonValue {
    fn into_params(self) -> Vec<Param> {
        match self {
            JsonValue::Array(items) => items.into_iter().map(Param::from).collect(),
            other => vec![Param::from(other)],
        }
    }
}

macro_rules! into_params_scalar {
    ($($t:ty),*) => {
        $(impl IntoParams for $t {
            fn into_params(self) -> Vec<Param> {
                vec![Param::from(self)]
            }
        })*
    };
}

into_params_scalar!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, &String,
    NaiveDateTime
);

impl IntoParams for &str {
    fn into_params(self) -> Vec<Param> {
        vec![Param::from(self)]
    }
}

/// Build a heterogeneous `Vec<Param>`.
///
/// ```rust
/// use sql_access::prelude::*;
///
/// let p = params![1, true, "x", None::<i64>];
/// assert_eq!(p, vec![Param::Int(1), Param::Bool(true), Param::Text("x".into()), Param::Null]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Param>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Param::from($value)),+]
    };
}

/// The bind kind a parameter is translated into.
///
/// Closed on purpose: every variant must be handled wherever values reach the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Integer(i64),
    Float(f64),
    Text(String),
    /// Canonical JSON text of a structured value
    SerializedComposite(String),
}

impl ParameterValue {
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            ParameterValue::Integer(_) => "integer",
            ParameterValue::Float(_) => "float",
            ParameterValue::Text(_) => "text",
            ParameterValue::SerializedComposite(_) => "serialized-composite",
        }
    }

    /// Text carried by `Text` and `SerializedComposite` values.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) | ParameterValue::SerializedComposite(s) => Some(s),
            ParameterValue::Integer(_) | ParameterValue::Float(_) => None,
        }
    }
}

/// Values read back out of a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
    /// NULL value
    Null,
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_int() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        let s = self.as_text()?;
        // Try "YYYY-MM-DD HH:MM:SS", then with fractional seconds
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Decode a text column holding serialized JSON (e.g. a bound composite).
    #[must_use]
    pub fn as_json(&self) -> Option<JsonValue> {
        serde_json::from_str(self.as_text()?).ok()
    }
}

/// What to do when the driver reports a failed execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionFailurePolicy {
    /// Report the failure as a result with no rows; the driver message stays
    /// available through `ResultHandle::execution_error`.
    #[default]
    EmptyResult,
    /// Surface the failure as `SqlAccessError::ExecutionFailed`.
    Strict,
}

impl FromStr for ExecutionFailurePolicy {
    type Err = SqlAccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" | "empty-result" | "empty_result" => Ok(Self::EmptyResult),
            "strict" => Ok(Self::Strict),
            other => Err(SqlAccessError::ConfigError(format!(
                "unknown execution failure policy: {other}"
            ))),
        }
    }
}

/// Sort direction for `Database::get_table_rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl From<bool> for SortOrder {
    /// `true` means descending.
    fn from(descending: bool) -> Self {
        if descending { SortOrder::Desc } else { SortOrder::Asc }
    }
}

/// Convert translated parameters into a backend's own parameter type.
pub trait ParamConverter<'a> {
    type Converted;

    /// Convert a slice of `ParameterValue` into the backend's parameter type.
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError` if the conversion fails for any parameter.
    fn convert_sql_params(params: &'a [ParameterValue]) -> Result<Self::Converted, SqlAccessError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_map_to_scalar_params() {
        assert_eq!(Param::from(json!(null)), Param::Null);
        assert_eq!(Param::from(json!(true)), Param::Bool(true));
        assert_eq!(Param::from(json!(-3)), Param::Int(-3));
        assert_eq!(Param::from(json!(u64::MAX)), Param::UInt(u64::MAX));
        assert_eq!(Param::from(json!(1.5)), Param::Float(1.5));
        assert_eq!(Param::from(json!("s")), Param::Text("s".into()));
        assert_eq!(
            Param::from(json!([1, 2])),
            Param::Structured(json!([1, 2]))
        );
    }

    #[test]
    fn narrow_integers_widen_to_int() {
        assert_eq!(Param::from(-8_i8), Param::Int(-8));
        assert_eq!(Param::from(u8::MAX), Param::Int(255));
        assert_eq!(Param::from(u16::MAX), Param::Int(65_535));
        assert_eq!(Param::from(u32::MAX), Param::Int(i64::from(u32::MAX)));
        assert_eq!(Param::from(u64::MAX), Param::UInt(u64::MAX));
    }

    #[test]
    fn single_value_promotes_to_one_element_list() {
        assert_eq!(7_i64.into_params(), vec![7_i64].into_params());
        assert_eq!("a".into_params(), ["a"].into_params());
        assert_eq!(Param::Float(1.0).into_params(), vec![Param::Float(1.0)]);
        assert_eq!(None::<i32>.into_params(), vec![Param::Null]);
    }

    #[test]
    fn json_array_is_the_list_itself() {
        assert_eq!(
            json!([1, "b"]).into_params(),
            vec![Param::Int(1), Param::Text("b".into())]
        );
        assert_eq!(
            json!({"x": 1}).into_params(),
            vec![Param::Structured(json!({"x": 1}))]
        );
    }

    #[test]
    fn params_macro_mixes_kinds() {
        let p = params![1_u8, 2.5_f32, "t", false];
        assert_eq!(
            p,
            vec![
                Param::Int(1),
                Param::Float(2.5),
                Param::Text("t".into()),
                Param::Bool(false)
            ]
        );
        assert!(params![].is_empty());
    }

    #[test]
    fn row_value_accessors() {
        assert_eq!(RowValues::Int(1).as_bool(), Some(true));
        assert_eq!(RowValues::Int(2).as_bool(), None);
        assert!(RowValues::Null.is_null());
        assert_eq!(
            RowValues::Text("2024-01-01 08:00:01".into()).as_timestamp(),
            NaiveDateTime::parse_from_str("2024-01-01 08:00:01", "%Y-%m-%d %H:%M:%S").ok()
        );
        assert_eq!(
            RowValues::Text(r#"{"a":[1]}"#.into()).as_json(),
            Some(json!({"a": [1]}))
        );
    }

    #[test]
    fn failure_policy_parses() {
        assert_eq!(
            "strict".parse::<ExecutionFailurePolicy>().ok(),
            Some(ExecutionFailurePolicy::Strict)
        );
        assert_eq!(
            " Empty ".parse::<ExecutionFailurePolicy>().ok(),
            Some(ExecutionFailurePolicy::EmptyResult)
        );
        assert!("loud".parse::<ExecutionFailurePolicy>().is_err());
    }
}
