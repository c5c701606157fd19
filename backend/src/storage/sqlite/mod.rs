//! Remote table-per-user storage backend (SQLite via SQLx).

pub mod db;

pub use db::{DbConnection, RemoteStoreError, SqliteCollectionStore};
