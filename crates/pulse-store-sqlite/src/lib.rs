//! SQLite backend for the Pulse entity store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Only the raw fact streams are stored;
//! derived results are always recomputed.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{ImportSummary, SqliteStore};
