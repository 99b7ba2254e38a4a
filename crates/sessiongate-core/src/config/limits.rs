//! Per-role limit policy configuration.
//!
//! Role entries are deserialized with their rule fields as raw strings and
//! converted to a typed [`Policy`] by [`RolePolicy::validate`] at load time.
//! This keeps validation out of the evaluation path while still letting a
//! single malformed role entry be skipped instead of failing the whole
//! configuration load.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::policy::{IpBlockMode, LimitDimension, OverflowMethod, Policy};

/// Ordered per-role policy configuration.
///
/// The order of `roles` defines the known-role enumeration order used for
/// role resolution: the first configured role that a user holds wins.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LimitsConfig {
    /// Role policy entries in resolution priority order.
    #[serde(default)]
    pub roles: Vec<RolePolicy>,
}

/// One role's policy entry as it appears in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePolicy {
    /// Role identifier this policy applies to.
    pub role: String,
    /// IP-range admission rule. Unknown values fail open to `none`.
    #[serde(default = "default_ip_block_mode")]
    pub ip_block_mode: String,
    /// Grouping axis for concurrency limiting.
    #[serde(default = "default_limit_dimension")]
    pub limit_dimension: String,
    /// Maximum concurrent sessions per dimension group. Must be positive
    /// when `limit_dimension` is not `none`.
    #[serde(default)]
    pub limit_count: u32,
    /// Overflow handling when the limit is exceeded.
    #[serde(default = "default_overflow_method")]
    pub overflow_method: String,
    /// Hours of inactivity before idle expiry; `0` disables it.
    #[serde(default)]
    pub idle_timeout_hours: u32,
    /// Regular login cookie lifetime in hours.
    #[serde(default = "default_cookie_ttl_hours")]
    pub cookie_ttl_hours: u64,
    /// "Remember me" cookie lifetime in hours.
    #[serde(default = "default_cookie_remember_ttl_hours")]
    pub cookie_remember_ttl_hours: u64,
}

impl RolePolicy {
    /// Convert this raw entry into a typed [`Policy`].
    ///
    /// Unknown dimension or overflow values and a zero limit on a limiting
    /// dimension are configuration errors; the catalog decides whether to
    /// drop the entry or abort the load. An unknown `ip_block_mode` is not
    /// an error — it fails open to `none` with a warning.
    pub fn validate(&self) -> Result<Policy, EngineError> {
        let ip_block_mode = IpBlockMode::from_config_value(&self.ip_block_mode);
        let limit_dimension: LimitDimension = self.limit_dimension.parse()?;
        let overflow_method: OverflowMethod = self.overflow_method.parse()?;

        if limit_dimension != LimitDimension::None && self.limit_count == 0 {
            return Err(EngineError::validation(format!(
                "Role '{}': limit_count must be positive when limit_dimension is '{}'",
                self.role, limit_dimension
            )));
        }

        Ok(Policy {
            ip_block_mode,
            limit_dimension,
            limit_count: self.limit_count,
            overflow_method,
            idle_timeout_hours: self.idle_timeout_hours,
            cookie_ttl_hours: self.cookie_ttl_hours,
            cookie_remember_ttl_hours: self.cookie_remember_ttl_hours,
        })
    }
}

fn default_ip_block_mode() -> String {
    "none".to_string()
}

fn default_limit_dimension() -> String {
    "none".to_string()
}

fn default_overflow_method() -> String {
    "deny".to_string()
}

fn default_cookie_ttl_hours() -> u64 {
    48
}

fn default_cookie_remember_ttl_hours() -> u64 {
    336
}
