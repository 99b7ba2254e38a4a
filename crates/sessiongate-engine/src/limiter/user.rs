//! Per-user limiter: the base case every dimension defers to.

use sessiongate_entity::SessionSet;

use super::{LimitOutcome, TrimPlan};

/// Evaluate the per-user limit over a full session set.
///
/// If the set has room (`|S| < limit`) the login is admitted untouched.
/// Otherwise the oldest sessions are trimmed until exactly `limit` remain,
/// and the oldest survivor is returned as the named victim. The overflow
/// method decides that victim's fate: `evict_oldest` removes it too (making
/// room for the candidate), `deny` refuses the login and the whole plan is
/// discarded.
pub fn evaluate(sessions: &SessionSet, limit: u32) -> TrimPlan {
    if (sessions.len() as u32) < limit {
        return TrimPlan::allow();
    }

    let mut ordered = sessions.sorted_by_login();
    let mut removals = Vec::new();

    while ordered.len() as u32 > limit {
        removals.push(ordered.remove(0).token.clone());
    }

    match ordered.first() {
        Some(survivor) => TrimPlan {
            removals,
            outcome: LimitOutcome::Evict(survivor.token.clone()),
        },
        // Unreachable with a validated (positive) limit, but a zero limit
        // must not panic: refuse via the last trimmed token.
        None => match removals.pop() {
            Some(token) => TrimPlan {
                removals,
                outcome: LimitOutcome::Evict(token),
            },
            None => TrimPlan::allow(),
        },
    }
}
