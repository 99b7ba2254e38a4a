//! Per-user session set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::SessionRecord;

/// All active sessions of one user, keyed by token.
///
/// Backed by a `BTreeMap` so iteration order is stable (token-ordered),
/// which makes every tie-break in the limiting algorithms deterministic.
/// Token uniqueness within the set is the map invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSet {
    records: BTreeMap<String, SessionRecord>,
}

impl SessionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any existing record with the same token.
    pub fn insert(&mut self, record: SessionRecord) -> Option<SessionRecord> {
        self.records.insert(record.token.clone(), record)
    }

    /// Remove a record by token.
    pub fn remove(&mut self, token: &str) -> Option<SessionRecord> {
        self.records.remove(token)
    }

    /// Look up a record by token.
    pub fn get(&self, token: &str) -> Option<&SessionRecord> {
        self.records.get(token)
    }

    /// Look up a record by token for mutation.
    pub fn get_mut(&mut self, token: &str) -> Option<&mut SessionRecord> {
        self.records.get_mut(token)
    }

    /// Whether a token is present.
    pub fn contains(&self, token: &str) -> bool {
        self.records.contains_key(token)
    }

    /// Number of sessions in the set.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in stable (token) order.
    pub fn iter(&self) -> impl Iterator<Item = &SessionRecord> {
        self.records.values()
    }

    /// Records sorted by `login_time` ascending, ties broken by token.
    ///
    /// This is the eviction order: the first element is always the next
    /// victim candidate.
    pub fn sorted_by_login(&self) -> Vec<&SessionRecord> {
        let mut records: Vec<&SessionRecord> = self.records.values().collect();
        records.sort_by(|a, b| {
            a.login_time
                .cmp(&b.login_time)
                .then_with(|| a.token.cmp(&b.token))
        });
        records
    }

    /// The oldest record by `login_time` (ties broken by token).
    pub fn oldest(&self) -> Option<&SessionRecord> {
        self.sorted_by_login().into_iter().next()
    }

    /// Keep only records matching the predicate.
    pub fn retain(&mut self, mut predicate: impl FnMut(&SessionRecord) -> bool) {
        self.records.retain(|_, record| predicate(record));
    }
}

impl FromIterator<SessionRecord> for SessionSet {
    fn from_iter<I: IntoIterator<Item = SessionRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}
