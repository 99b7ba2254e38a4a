//! Session persistence trait.

use async_trait::async_trait;
use uuid::Uuid;

use sessiongate_core::EngineResult;
use sessiongate_entity::SessionSet;

/// Durable per-user session persistence.
///
/// A failing load or save is fatal for the evaluation that issued it: the
/// engine never proceeds on a session set it could not read or write back.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a user's session set. A user with no stored sessions yields an
    /// empty set, not an error.
    async fn load(&self, user_id: Uuid) -> EngineResult<SessionSet>;

    /// Persist a user's session set, replacing the stored one.
    async fn save(&self, user_id: Uuid, sessions: &SessionSet) -> EngineResult<()>;
}
