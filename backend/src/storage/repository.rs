//! Typed repository over any [`CollectionStorage`] backend.

use anyhow::{Context, Result};
use serde_json::Value;
use shared::FarmRecord;
use std::sync::Arc;
use tracing::warn;

use super::traits::CollectionStorage;

/// A loaded collection plus the stored entries that no longer decode
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCollection<T> {
    pub records: Vec<T>,
    /// Raw entries kept aside so the next save writes them back untouched
    pub unreadable: Vec<Value>,
}

/// Loads and saves whole typed collections through a storage backend
#[derive(Clone)]
pub struct FarmRepository {
    storage: Arc<dyn CollectionStorage>,
}

impl FarmRepository {
    pub fn new(storage: Arc<dyn CollectionStorage>) -> Self {
        Self { storage }
    }

    /// Load every record of `T`'s collection.
    ///
    /// Records that no longer match the record shape are set aside with a
    /// warning so one bad entry cannot hide the rest of the collection.
    pub async fn load<T: FarmRecord>(&self) -> Result<LoadedCollection<T>> {
        let raw = self.storage.load_collection(T::KIND).await?;
        let mut records = Vec::with_capacity(raw.len());
        let mut unreadable = Vec::new();

        for (index, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<T>(value.clone()) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Skipping malformed {} record at position {}: {}", T::KIND, index, e);
                    unreadable.push(value);
                }
            }
        }

        Ok(LoadedCollection { records, unreadable })
    }

    /// Replace `T`'s stored collection with `records`, followed by the
    /// `preserved` raw entries that could not be decoded on load
    pub async fn save<T: FarmRecord>(&self, records: &[T], preserved: &[Value]) -> Result<()> {
        let mut values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("serializing {} records", T::KIND))?;
        values.extend(preserved.iter().cloned());

        self.storage.save_collection(T::KIND, values).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::JsonFileStore;
    use chrono::Utc;
    use serde_json::json;
    use shared::{CollectionKind, Lot};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_typed_round_trip_and_malformed_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileStore::new(temp_dir.path()).unwrap());
        let repository = FarmRepository::new(store.clone());

        let lot = Lot {
            id: shared::generate_record_id(),
            name: "North pasture".to_string(),
            color: "#22c55e".to_string(),
            created_at: Utc::now(),
        };
        repository.save(&[lot.clone()], &[]).await.unwrap();
        let loaded = repository.load::<Lot>().await.unwrap();
        assert_eq!(loaded.records, vec![lot.clone()]);
        assert!(loaded.unreadable.is_empty());

        // A foreign entry in the file must not hide the valid ones
        let broken = json!({"id": "broken"});
        let mut raw = store.load_collection(CollectionKind::Lots).await.unwrap();
        raw.push(broken.clone());
        store.save_collection(CollectionKind::Lots, raw).await.unwrap();

        let loaded = repository.load::<Lot>().await.unwrap();
        assert_eq!(loaded.records, vec![lot.clone()]);
        assert_eq!(loaded.unreadable, vec![broken.clone()]);

        // Saving again writes the unreadable entry back after the records
        repository.save(&loaded.records, &loaded.unreadable).await.unwrap();
        let raw = store.load_collection(CollectionKind::Lots).await.unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1], broken);
    }
}
