//! Idle expiry tracking.

use chrono::{DateTime, Duration, Utc};

use sessiongate_entity::SessionRecord;

/// Refresh a session's idle-expiry deadline from policy.
///
/// Called once per request cycle for the session tied to the authenticated
/// requester. A zero timeout disables idle expiry and clears any existing
/// deadline.
pub fn refresh_idle_expiry(
    record: &mut SessionRecord,
    idle_timeout_hours: u32,
    now: DateTime<Utc>,
) {
    if idle_timeout_hours == 0 {
        record.idle_expiry = None;
    } else {
        record.idle_expiry = Some(now + Duration::hours(idle_timeout_hours as i64));
    }
}
