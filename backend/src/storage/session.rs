use std::sync::{Arc, RwLock};
use tracing::info;

use super::traits::SessionProvider;

/// In-memory session holding the signed-in user's ID
#[derive(Clone, Default)]
pub struct UserSession {
    user_id: Arc<RwLock<Option<String>>>,
}

impl UserSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that is already signed in, mostly useful for tests and single-user setups
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        let session = Self::new();
        session.start(user_id);
        session
    }

    pub fn start(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        info!(user_id = %user_id, "session started");
        let mut guard = self.user_id.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(user_id);
    }

    pub fn end(&self) {
        let mut guard = self.user_id.write().unwrap_or_else(|e| e.into_inner());
        if let Some(user_id) = guard.take() {
            info!(user_id = %user_id, "session ended");
        }
    }
}

impl SessionProvider for UserSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let session = UserSession::new();
        assert_eq!(session.current_user_id(), None);

        session.start("user-1");
        assert_eq!(session.current_user_id().as_deref(), Some("user-1"));

        // Clones share the same session
        let other = session.clone();
        other.end();
        assert_eq!(session.current_user_id(), None);
    }
}
