// SQLite backend - the connection collaborator the core runs statements on
//
// - config: session options and builder
// - connection: open/close, blocking execution with deadlines, escaping
// - params: translated parameters to rusqlite values
// - query: row value extraction and result buffering

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::{SqliteConnection, escape_identifier, escape_literal};
pub use params::Params;
