//! Type-directed parameter binding and generic row records over `SQLite`.
//!
//! A query template with `?` placeholders and a heterogeneous list of values goes in;
//! every value is classified into a bind kind, the statement is prepared, bound and run,
//! and result rows come back as independent [`Record`]s keyed by column name.
//!
//! ```rust,no_run
//! use sql_access::prelude::*;
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), SqlAccessError> {
//! let mut db = Database::connect(SqliteOptions::new(":memory:".into())).await?;
//! db.execute_batch("CREATE TABLE t (id INTEGER, doc TEXT)").await?;
//! db.execute("INSERT INTO t VALUES (?, ?)", params![1, json!({"x": 1})]).await?;
//! let rows = db.get_table_rows("t", "id", 1, None, SortOrder::Asc).await?;
//! assert_eq!(rows[0].get("doc").and_then(RowValues::as_json), Some(json!({"x": 1})));
//! # Ok(()) }
//! ```

pub mod database;
pub mod error;
pub mod executor;
pub mod monitor;
pub mod prelude;
pub mod results;
pub mod sqlite;
pub mod statement;
pub mod translator;
pub mod types;

pub use database::Database;
pub use error::SqlAccessError;
pub use monitor::{QueryMonitor, QueryMonitorEntry};
pub use results::{FieldNames, Record, ResultHandle, fetch_all, fetch_one};
pub use statement::BoundStatement;
pub use translator::{classify, classify_all};
pub use types::{
    ExecutionFailurePolicy, IntoParams, Param, ParamConverter, ParameterValue, RowValues,
    SortOrder,
};
