//! SQLite backend for the siterank catalog.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod admin;
mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::Table;
pub use store::SqliteStore;
