//! Domain core of the todo service.
//!
//! # Overview
//! Holds everything about todos that does not touch the network: the record
//! model, validation of listing parameters, rendering of the bounded listing
//! query, and derivation of page cursors from returned rows. The server
//! crate executes the statements and ships the results over HTTP.
//!
//! # Design
//! - `PageQuery` is built from raw query-string values and rendered with
//!   `to_cql`, so the exact statement sent to the store is unit-testable.
//! - `TodoPage::from_rows` is the only place cursors are derived.
//! - `partition_token` reproduces the store's token function, letting an
//!   in-process store order rows exactly like the real one.

pub mod error;
pub mod pagination;
pub mod partition;
pub mod status;
pub mod types;

pub use error::ParamError;
pub use pagination::{
    BindValue, CqlStatement, Cursor, ListParams, PageLimits, PageQuery, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE, TODO_COLUMNS,
};
pub use partition::partition_token;
pub use status::StatusPolicy;
pub use types::{CreateTodo, Todo, TodoPage, UpdateTodo};
