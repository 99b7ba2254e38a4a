//! Evaluation verdict types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::policy::LimitDimension;

/// Machine-readable reason code attached to a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The candidate IP failed the IP-range admission rule.
    IpRangeBlocked,
    /// The dimension limit was reached and the policy refuses overflow.
    LimitExceeded,
}

impl DenyReason {
    /// Return the reason as its wire code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IpRangeBlocked => "ip_range_blocked",
            Self::LimitExceeded => "limit_exceeded",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Policy context attached to denials and evictions so the host can audit
/// the decision without re-resolving the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyContext {
    /// The role whose policy produced the verdict.
    pub role: String,
    /// The limiting dimension in force.
    pub dimension: LimitDimension,
    /// The limit in force, absent when the dimension is `None`.
    pub limit: Option<u32>,
}

/// Final result of one login evaluation.
///
/// `Denied` is an expected business outcome, never a system fault; system
/// faults (store failures) surface as `EngineError` instead. `Misconfigured`
/// is only produced under strict configuration handling — the lenient mode
/// logs the problem and admits the login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The login may proceed; no session was touched.
    Allowed,
    /// The login may proceed after the listed sessions were evicted.
    EvictedThenAllowed {
        /// Tokens of the sessions removed to make room, in eviction order.
        evicted: Vec<String>,
        /// The policy that forced the eviction.
        context: PolicyContext,
    },
    /// The login is refused; no session was mutated.
    Denied {
        /// Machine-readable reason code.
        reason: DenyReason,
        /// The policy that refused the login.
        context: PolicyContext,
    },
    /// No usable policy exists for the user's role (strict handling).
    Misconfigured {
        /// Description of the configuration problem.
        reason: String,
    },
}

impl Verdict {
    /// Whether the candidate login is admitted by this verdict.
    pub fn admits_login(&self) -> bool {
        matches!(self, Self::Allowed | Self::EvictedThenAllowed { .. })
    }
}
