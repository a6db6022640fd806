//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::database::Database;
pub use crate::error::SqlAccessError;
pub use crate::monitor::{QueryMonitor, QueryMonitorEntry};
pub use crate::params;
pub use crate::results::{FieldNames, Record, ResultHandle, fetch_all, fetch_one};
pub use crate::sqlite::{SqliteOptions, SqliteOptionsBuilder};
pub use crate::translator::classify;
pub use crate::types::{
    ExecutionFailurePolicy, IntoParams, Param, ParameterValue, RowValues, SortOrder,
};
