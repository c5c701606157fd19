/// Test utilities module for automatic cleanup and consistent test infrastructure
///
/// This module provides RAII-based cleanup that guarantees test data is removed
/// even if tests panic or fail.
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use shared::{CollectionKind, Severity};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::{RwLock, RwLockWriteGuard};

use super::json::JsonFileStore;
use super::session::UserSession;
use super::traits::CollectionStorage;
use crate::domain::notifications::NotificationSink;

pub const TEST_USER: &str = "test-user";

/// RAII Test Environment that automatically cleans up on drop
pub struct TestEnvironment {
    /// Kept alive until drop so the directory is not removed early
    _temp_dir: TempDir,
    pub store: Arc<FlakyStorage>,
    pub session: UserSession,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestEnvironment {
    /// Fresh data directory with a signed-in test user
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let store = Arc::new(FlakyStorage::new(JsonFileStore::new(temp_dir.path())?));

        Ok(Self {
            _temp_dir: temp_dir,
            store,
            session: UserSession::signed_in(TEST_USER),
            notifier: Arc::new(RecordingNotifier::default()),
        })
    }
}

/// Storage wrapper whose saves can be made to fail on demand
pub struct FlakyStorage {
    inner: JsonFileStore,
    fail_saves: AtomicBool,
}

impl FlakyStorage {
    pub fn new(inner: JsonFileStore) -> Self {
        Self {
            inner,
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CollectionStorage for FlakyStorage {
    async fn load_collection(&self, kind: CollectionKind) -> Result<Vec<Value>> {
        self.inner.load_collection(kind).await
    }

    async fn save_collection(&self, kind: CollectionKind, records: Vec<Value>) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            anyhow::bail!("simulated outage while saving {}", kind);
        }
        self.inner.save_collection(kind, records).await
    }
}

/// Storage wrapper whose loads can be held open to interleave other calls
pub struct GatedStorage {
    inner: Arc<dyn CollectionStorage>,
    gate: RwLock<()>,
}

impl GatedStorage {
    pub fn new(inner: Arc<dyn CollectionStorage>) -> Self {
        Self {
            inner,
            gate: RwLock::new(()),
        }
    }

    /// Loads block until the returned guard is dropped
    pub async fn hold_loads(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().await
    }
}

#[async_trait]
impl CollectionStorage for GatedStorage {
    async fn load_collection(&self, kind: CollectionKind) -> Result<Vec<Value>> {
        let _open = self.gate.read().await;
        self.inner.load_collection(kind).await
    }

    async fn save_collection(&self, kind: CollectionKind, records: Vec<Value>) -> Result<()> {
        self.inner.save_collection(kind, records).await
    }
}

/// Notification sink that remembers everything it was told
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(Severity, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(Severity, String)> {
        self.messages.lock().unwrap().last().cloned()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        self.messages.lock().unwrap().push((severity, message.to_string()));
    }
}
