//! `rqlite-http` is an async HTTP client for the rqlite distributed SQL
//! database.
//!
//! The crate wraps the `/db/execute` and `/db/query` endpoints:
//! - [`RqliteClient::execute`] for writes, optionally deferred into a
//!   client-side buffer that is committed as one transaction
//! - [`RqliteClient::query`] for reads, honoring the configured
//!   [`ConsistencyLevel`]
//! - [`RqliteClient::status`], [`RqliteClient::nodes`] and
//!   [`RqliteClient::ready`] for cluster inspection

mod client;
mod config;
mod decode;
mod error;
mod options;
mod params;
mod transport;
mod types;
mod value;
mod wire;

#[cfg(feature = "row-map")]
pub mod row_map;

pub use client::RqliteClient;
pub use config::ConnectionConfig;
pub use error::RqliteError;
pub use options::{ClientOptions, ConsistencyLevel};
pub use params::{Params, Statement};
pub use types::{CompletedResponse, ExecResult, QueryResult, Response, StatementOutcome};
pub use value::Value;

pub type Result<T> = std::result::Result<T, RqliteError>;
