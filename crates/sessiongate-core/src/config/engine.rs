//! Engine behavior configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the engine reacts to a missing or invalid policy at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// A missing policy is fatal for the login: the verdict is
    /// `Misconfigured` and the caller is expected to block the login.
    Strict,
    /// A missing policy is logged and the login is admitted.
    Lenient,
}

impl Default for Strictness {
    fn default() -> Self {
        Self::Lenient
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

/// Which eviction sequencing the limiter uses when a group is over its
/// limit and the overflow method is `evict_oldest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionMode {
    /// Trim the over-limit group down to the limit, re-run the per-user
    /// pass over the trimmed set, and also evict the victim that pass
    /// names. This reproduces the original system's sequencing, including
    /// its extra nominal victim.
    Chained,
    /// Evict exactly one session: the oldest of the over-limit group.
    Minimal,
}

impl Default for EvictionMode {
    fn default() -> Self {
        Self::Chained
    }
}

impl fmt::Display for EvictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chained => write!(f, "chained"),
            Self::Minimal => write!(f, "minimal"),
        }
    }
}

/// Engine-wide settings, independent of any single role policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngineSettings {
    /// Missing/invalid policy handling.
    #[serde(default)]
    pub strictness: Strictness,
    /// Eviction sequencing for over-limit groups.
    #[serde(default)]
    pub eviction_mode: EvictionMode,
}
