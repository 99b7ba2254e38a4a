//! Expired session reaping.

use chrono::{DateTime, Utc};

use sessiongate_entity::SessionSet;

/// Result of one reaper sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepStats {
    /// Sessions surviving the sweep.
    pub remaining: SessionSet,
    /// Sessions removed past their inactivity deadline.
    pub idle_terminated: u32,
    /// Sessions removed past their hard lifetime deadline.
    pub expired_terminated: u32,
}

impl SweepStats {
    /// Total sessions the sweep removed.
    pub fn terminated(&self) -> u32 {
        self.idle_terminated + self.expired_terminated
    }
}

/// Sweep a session set, removing idle-expired and absolute-expired records.
///
/// The idle check takes precedence: a record past both deadlines counts as
/// idle-terminated. Sweeping is pure and idempotent — a set with nothing
/// expired passes through unchanged, and sweeping the result again with the
/// same `now` removes nothing.
pub fn sweep(sessions: &SessionSet, now: DateTime<Utc>) -> SweepStats {
    let mut remaining = SessionSet::new();
    let mut idle_terminated = 0;
    let mut expired_terminated = 0;

    for record in sessions.iter() {
        if record.is_idle_expired(now) {
            idle_terminated += 1;
        } else if record.is_absolute_expired(now) {
            expired_terminated += 1;
        } else {
            remaining.insert(record.clone());
        }
    }

    SweepStats {
        remaining,
        idle_terminated,
        expired_terminated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sessiongate_entity::SessionRecord;

    fn record(token: &str) -> SessionRecord {
        SessionRecord::new(
            token,
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            "10.0.0.1".parse().unwrap(),
            None,
        )
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_nothing_expired_passes_through() {
        let mut set = SessionSet::new();
        set.insert(record("a"));
        set.insert(record("b"));

        let stats = sweep(&set, at(13));
        assert_eq!(stats.remaining, set);
        assert_eq!(stats.terminated(), 0);
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let mut idle = record("idle");
        idle.idle_expiry = Some(at(13));
        let mut set = SessionSet::new();
        set.insert(idle);
        set.insert(record("live"));

        let now = at(14);
        let first = sweep(&set, now);
        assert_eq!(first.idle_terminated, 1);

        let second = sweep(&first.remaining, now);
        assert_eq!(second.remaining, first.remaining);
        assert_eq!(second.terminated(), 0);
    }

    #[test]
    fn test_idle_takes_precedence_over_absolute() {
        let mut both = record("both");
        both.idle_expiry = Some(at(13));
        both.absolute_expiry = Some(at(13));
        let mut set = SessionSet::new();
        set.insert(both);

        let stats = sweep(&set, at(14));
        assert_eq!(stats.idle_terminated, 1);
        assert_eq!(stats.expired_terminated, 0);
    }

    #[test]
    fn test_categories_are_counted_separately() {
        let mut idle = record("idle");
        idle.idle_expiry = Some(at(13));
        let mut expired = record("expired");
        expired.absolute_expiry = Some(at(13));

        let mut set = SessionSet::new();
        set.insert(idle);
        set.insert(expired);
        set.insert(record("live"));

        let stats = sweep(&set, at(14));
        assert_eq!(stats.idle_terminated, 1);
        assert_eq!(stats.expired_terminated, 1);
        assert_eq!(stats.remaining.len(), 1);
        assert!(stats.remaining.contains("live"));
    }

    #[test]
    fn test_deadline_not_yet_passed_survives() {
        let mut rec = record("a");
        rec.idle_expiry = Some(at(14));
        let mut set = SessionSet::new();
        set.insert(rec);

        // Exactly at the deadline is not yet past it.
        let stats = sweep(&set, at(14));
        assert_eq!(stats.terminated(), 0);
    }
}
