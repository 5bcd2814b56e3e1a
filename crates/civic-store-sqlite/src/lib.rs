//! SQLite backend for the civic report store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] implements both
//! [`civic_core::store::AgencyStore`] and [`civic_core::store::ReportStore`],
//! so referential checks and inserts share a transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
