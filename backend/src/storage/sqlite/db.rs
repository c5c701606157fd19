//! # Remote Collection Store
//!
//! Table-backed storage keyed by (user, collection kind). Each row holds the
//! whole collection as a JSON document:
//!
//! ```text
//! user_data(id, user_id, data_type, data, created_at, updated_at)
//!           UNIQUE (user_id, data_type)
//! ```
//!
//! Saving is a single `INSERT ... ON CONFLICT DO UPDATE` statement, so two
//! sessions saving the same kind for the same user never produce two rows.
//! Content is still last-writer-wins.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use shared::CollectionKind;
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info};

use crate::storage::traits::{CollectionStorage, SessionProvider};

#[derive(Debug, thiserror::Error)]
pub enum RemoteStoreError {
    #[error("not authorized: no user is signed in")]
    NotAuthorized,
    #[error("stored {kind} document is not a JSON array")]
    MalformedDocument { kind: CollectionKind },
}

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Connect to `url`, creating the database and schema if needed
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url)
                .await
                .with_context(|| format!("creating database {}", url))?;
            info!("Created database {}", url);
        }

        let pool = SqlitePool::connect(url)
            .await
            .with_context(|| format!("connecting to {}", url))?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_data (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                data_type TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, data_type)
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Remote store scoped to whoever the session says is signed in
#[derive(Clone)]
pub struct SqliteCollectionStore {
    connection: DbConnection,
    session: Arc<dyn SessionProvider>,
}

impl SqliteCollectionStore {
    pub fn new(connection: DbConnection, session: Arc<dyn SessionProvider>) -> Self {
        Self { connection, session }
    }

    fn require_user(&self) -> Result<String> {
        self.session
            .current_user_id()
            .ok_or_else(|| RemoteStoreError::NotAuthorized.into())
    }

    /// Number of rows stored for a user and kind (0 or 1)
    pub async fn row_count(&self, user_id: &str, kind: CollectionKind) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM user_data WHERE user_id = ? AND data_type = ?",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_one(self.connection.pool())
        .await?;

        Ok(row.get("count"))
    }
}

#[async_trait]
impl CollectionStorage for SqliteCollectionStore {
    async fn load_collection(&self, kind: CollectionKind) -> Result<Vec<Value>> {
        let user_id = self.require_user()?;

        let row = sqlx::query("SELECT data FROM user_data WHERE user_id = ? AND data_type = ?")
            .bind(&user_id)
            .bind(kind.as_str())
            .fetch_optional(self.connection.pool())
            .await
            .with_context(|| format!("loading {} for user {}", kind, user_id))?;

        let Some(row) = row else {
            debug!("No {} row for user {}", kind, user_id);
            return Ok(Vec::new());
        };

        let data: String = row.get("data");
        match serde_json::from_str::<Value>(&data)? {
            Value::Array(records) => Ok(records),
            Value::Null => Ok(Vec::new()),
            _ => Err(RemoteStoreError::MalformedDocument { kind }.into()),
        }
    }

    async fn save_collection(&self, kind: CollectionKind, records: Vec<Value>) -> Result<()> {
        let user_id = self.require_user()?;
        let data = serde_json::to_string(&records)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO user_data (id, user_id, data_type, data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, data_type)
            DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(shared::generate_record_id())
        .bind(&user_id)
        .bind(kind.as_str())
        .bind(&data)
        .bind(&now)
        .bind(&now)
        .execute(self.connection.pool())
        .await
        .with_context(|| format!("saving {} for user {}", kind, user_id))?;

        debug!("Upserted {} {} records for user {}", records.len(), kind, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::session::UserSession;
    use serde_json::json;
    use tempfile::TempDir;

    async fn create_test_store(session: UserSession) -> (TempDir, SqliteCollectionStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let url = format!("sqlite:{}", temp_dir.path().join("farm.db").display());
        let connection = DbConnection::new(&url).await.expect("Failed to init test DB");
        (temp_dir, SqliteCollectionStore::new(connection, Arc::new(session)))
    }

    #[tokio::test]
    async fn test_requires_signed_in_user() {
        let (_temp_dir, store) = create_test_store(UserSession::new()).await;

        let err = store.load_collection(CollectionKind::Cattle).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RemoteStoreError>(),
            Some(RemoteStoreError::NotAuthorized)
        ));
        assert!(store.save_collection(CollectionKind::Cattle, vec![]).await.is_err());
    }

    #[tokio::test]
    async fn test_save_updates_existing_row() {
        let (_temp_dir, store) = create_test_store(UserSession::signed_in("user-1")).await;

        store
            .save_collection(CollectionKind::Buyers, vec![json!({"id": "b1"})])
            .await
            .unwrap();
        store
            .save_collection(CollectionKind::Buyers, vec![json!({"id": "b1"}), json!({"id": "b2"})])
            .await
            .unwrap();

        assert_eq!(store.row_count("user-1", CollectionKind::Buyers).await.unwrap(), 1);
        let loaded = store.load_collection(CollectionKind::Buyers).await.unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[tokio::test]
    async fn test_collections_are_scoped_per_user() {
        let session = UserSession::signed_in("user-1");
        let (_temp_dir, store) = create_test_store(session.clone()).await;

        store
            .save_collection(CollectionKind::Sales, vec![json!({"id": "s1"})])
            .await
            .unwrap();

        session.start("user-2");
        assert!(store.load_collection(CollectionKind::Sales).await.unwrap().is_empty());

        session.start("user-1");
        assert_eq!(store.load_collection(CollectionKind::Sales).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_saving_loaded_collection_is_idempotent() {
        let (_temp_dir, store) = create_test_store(UserSession::signed_in("user-1")).await;
        store
            .save_collection(CollectionKind::Lots, vec![json!({"id": "l1", "name": "A"})])
            .await
            .unwrap();

        let first = store.load_collection(CollectionKind::Lots).await.unwrap();
        store.save_collection(CollectionKind::Lots, first.clone()).await.unwrap();
        let second = store.load_collection(CollectionKind::Lots).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_concurrent_saves_never_duplicate_rows() {
        let (_temp_dir, store) = create_test_store(UserSession::signed_in("user-1")).await;

        let first_tab = store.clone();
        let second_tab = store.clone();
        let first = tokio::spawn(async move {
            first_tab
                .save_collection(CollectionKind::Cattle, vec![json!({"id": "from-first"})])
                .await
        });
        let second = tokio::spawn(async move {
            second_tab
                .save_collection(CollectionKind::Cattle, vec![json!({"id": "from-second"})])
                .await
        });
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        // One row survives; its content is whichever write landed last
        assert_eq!(store.row_count("user-1", CollectionKind::Cattle).await.unwrap(), 1);
        let loaded = store.load_collection(CollectionKind::Cattle).await.unwrap();
        assert_eq!(loaded.len(), 1);
        let id = loaded[0]["id"].as_str().unwrap();
        assert!(id == "from-first" || id == "from-second");
    }
}
