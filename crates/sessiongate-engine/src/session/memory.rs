//! In-memory session store for single-node deployments and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use sessiongate_core::EngineResult;
use sessiongate_entity::SessionSet;

use super::store::SessionStore;

/// In-memory session store using a Tokio mutex for thread safety.
///
/// Suitable for single-node deployments only.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    /// Protected per-user session sets.
    state: Arc<Mutex<HashMap<Uuid, SessionSet>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, user_id: Uuid) -> EngineResult<SessionSet> {
        let state = self.state.lock().await;
        Ok(state.get(&user_id).cloned().unwrap_or_default())
    }

    async fn save(&self, user_id: Uuid, sessions: &SessionSet) -> EngineResult<()> {
        let mut state = self.state.lock().await;
        state.insert(user_id, sessions.clone());
        Ok(())
    }
}
