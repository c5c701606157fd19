//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use shared::CollectionKind;

/// Trait defining the whole-collection persistence contract
///
/// Each collection kind is read and written as a single ordered sequence of
/// JSON records. Implementations never merge: a save replaces whatever was
/// stored for the kind before.
#[async_trait]
pub trait CollectionStorage: Send + Sync {
    /// Load every record of a collection, in insertion order.
    /// A collection that was never saved loads as empty.
    async fn load_collection(&self, kind: CollectionKind) -> Result<Vec<Value>>;

    /// Replace the stored collection with `records`
    async fn save_collection(&self, kind: CollectionKind, records: Vec<Value>) -> Result<()>;
}

/// Source of the identity of the currently signed-in user
pub trait SessionProvider: Send + Sync {
    /// `None` means nobody is signed in and nothing may be loaded or saved
    fn current_user_id(&self) -> Option<String>;
}
