//! Termination notification hooks.

use tracing::info;
use uuid::Uuid;

/// Fire-and-forget observability hooks for session terminations.
///
/// Methods are infallible by construction: whatever an implementation does
/// internally, a notification can never change or abort a verdict.
pub trait Notifier: Send + Sync {
    /// A session was evicted to enforce a concurrency limit.
    fn on_forced_terminate(&self, user_id: Uuid);

    /// Sessions were removed past their inactivity deadline.
    fn on_idle_terminate(&self, user_id: Uuid);

    /// Sessions were removed past their hard lifetime deadline.
    fn on_expired_terminate(&self, user_id: Uuid);
}

/// Notifier that emits structured log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn on_forced_terminate(&self, user_id: Uuid) {
        info!(user_id = %user_id, "Session forcibly terminated by limit policy");
    }

    fn on_idle_terminate(&self, user_id: Uuid) {
        info!(user_id = %user_id, "Idle session(s) terminated");
    }

    fn on_expired_terminate(&self, user_id: Uuid) {
        info!(user_id = %user_id, "Expired session(s) terminated");
    }
}
