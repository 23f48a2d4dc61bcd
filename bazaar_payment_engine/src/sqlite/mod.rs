//! SQLite backend for the Bazaar Payment Engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
