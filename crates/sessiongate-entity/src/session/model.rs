//! Session record entity.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One active login session of a user.
///
/// Records are created at login, have their `idle_expiry` refreshed while
/// the session is in use, and are destroyed by eviction or by the reaper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque session token, unique within the owning user's set.
    pub token: String,
    /// When the session was created.
    pub login_time: DateTime<Utc>,
    /// IP address the login came from.
    pub source_ip: IpAddr,
    /// User-Agent header value, if the client sent one.
    pub user_agent: Option<String>,
    /// Inactivity deadline; absent when idle expiry is disabled.
    pub idle_expiry: Option<DateTime<Utc>>,
    /// Hard lifetime deadline, independent of activity.
    pub absolute_expiry: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Create a record with no expiry deadlines.
    pub fn new(
        token: impl Into<String>,
        login_time: DateTime<Utc>,
        source_ip: IpAddr,
        user_agent: Option<&str>,
    ) -> Self {
        Self {
            token: token.into(),
            login_time,
            source_ip,
            user_agent: user_agent.map(String::from),
            idle_expiry: None,
            absolute_expiry: None,
        }
    }

    /// Whether the session has passed its inactivity deadline.
    pub fn is_idle_expired(&self, now: DateTime<Utc>) -> bool {
        self.idle_expiry.is_some_and(|deadline| now > deadline)
    }

    /// Whether the session has passed its hard lifetime deadline.
    pub fn is_absolute_expired(&self, now: DateTime<Utc>) -> bool {
        self.absolute_expiry.is_some_and(|deadline| now > deadline)
    }
}
