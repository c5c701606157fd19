//! # Storage Module
//!
//! Handles all data persistence for the farm records.
//!
//! Every collection kind is persisted as a whole ordered sequence. Two
//! interchangeable backends implement [`CollectionStorage`]:
//!
//! - **Local**: [`JsonFileStore`], one JSON file per kind in a data directory
//! - **Remote**: [`SqliteCollectionStore`], one row per (user, kind) in SQLite
//!
//! The domain layer only talks to [`FarmRepository`], which adds typed
//! encoding on top of whichever backend was configured.

pub mod json;
pub mod repository;
pub mod session;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use json::JsonFileStore;
pub use repository::{FarmRepository, LoadedCollection};
pub use session::UserSession;
pub use sqlite::{DbConnection, RemoteStoreError, SqliteCollectionStore};
pub use traits::{CollectionStorage, SessionProvider};
