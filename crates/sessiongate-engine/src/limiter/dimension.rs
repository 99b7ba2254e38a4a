//! Generic dimension limiter.

use sessiongate_core::types::DimensionKey;
use sessiongate_entity::{SessionRecord, SessionSet};

use super::{LimitOutcome, TrimPlan, user};

/// The generic grouping limiter.
///
/// One routine serves every dimension (user, ip, country, and each device
/// attribute); the caller supplies the key-extraction closure and the
/// candidate's own key. With the identity key (`DimensionKey::User`) the
/// routine degenerates into exactly the per-user base case.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionLimiter;

impl DimensionLimiter {
    /// Evaluate with the original chained sequencing.
    ///
    /// The candidate's dimension group is trimmed (oldest first) down to
    /// `limit`, then the per-user pass re-evaluates the whole trimmed set
    /// with the same limit and names its victim. Under `evict_oldest` that
    /// named victim is evicted as well — one more than the trim itself
    /// removed. This chained pass reproduces the original system's
    /// sequencing; [`DimensionLimiter::evaluate_minimal`] is the simplified
    /// alternative.
    pub fn evaluate<K>(
        sessions: &SessionSet,
        candidate_key: &DimensionKey,
        limit: u32,
        key_of: K,
    ) -> TrimPlan
    where
        K: Fn(&SessionRecord) -> DimensionKey,
    {
        let matching: Vec<&SessionRecord> = sessions
            .sorted_by_login()
            .into_iter()
            .filter(|record| key_of(record) == *candidate_key)
            .collect();

        if (matching.len() as u32) < limit {
            return TrimPlan::allow();
        }

        let mut matching = matching;
        let mut removals = Vec::new();

        while matching.len() as u32 > limit {
            removals.push(matching.remove(0).token.clone());
        }

        // Second pass: the per-user limiter over the trimmed full set.
        let mut trimmed = sessions.clone();
        for token in &removals {
            trimmed.remove(token);
        }

        let user_plan = user::evaluate(&trimmed, limit);
        removals.extend(user_plan.removals);

        TrimPlan {
            removals,
            outcome: user_plan.outcome,
        }
    }

    /// Evaluate with simplified single-eviction semantics.
    ///
    /// When the candidate's group is at or over the limit, the oldest
    /// session of that group alone is named as the victim; nothing is
    /// pre-trimmed and no second pass runs.
    pub fn evaluate_minimal<K>(
        sessions: &SessionSet,
        candidate_key: &DimensionKey,
        limit: u32,
        key_of: K,
    ) -> TrimPlan
    where
        K: Fn(&SessionRecord) -> DimensionKey,
    {
        let matching: Vec<&SessionRecord> = sessions
            .sorted_by_login()
            .into_iter()
            .filter(|record| key_of(record) == *candidate_key)
            .collect();

        if (matching.len() as u32) < limit {
            return TrimPlan::allow();
        }

        TrimPlan {
            removals: Vec::new(),
            outcome: LimitOutcome::Evict(matching[0].token.clone()),
        }
    }
}
