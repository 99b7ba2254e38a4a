//! Concurrency policy types.
//!
//! A [`Policy`] is resolved per role at evaluation time and is immutable for
//! the duration of one login evaluation. Limit expressions are structured
//! (`limit_dimension` + `limit_count`) and validated when the configuration
//! is loaded, never parsed from encoded strings at evaluation time.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EngineError;

/// IP-range admission rule applied before any dimension limiting runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpBlockMode {
    /// No IP restriction.
    None,
    /// Only private-range addresses may log in.
    AllowPrivateOnly,
    /// Only public-range addresses may log in.
    AllowPublicOnly,
}

impl Default for IpBlockMode {
    fn default() -> Self {
        Self::None
    }
}

impl IpBlockMode {
    /// Convert a raw configuration value, failing open on unknown input.
    ///
    /// An unrecognized mode is treated as [`IpBlockMode::None`] and reported
    /// as a configuration warning rather than an error, matching the
    /// fail-open handling of malformed policy data.
    pub fn from_config_value(raw: &str) -> Self {
        match raw.parse() {
            Ok(mode) => mode,
            Err(_) => {
                warn!(value = %raw, "Unrecognized ip_block_mode, failing open to 'none'");
                Self::None
            }
        }
    }

    /// Return the mode as its configuration string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::AllowPrivateOnly => "allow_private_only",
            Self::AllowPublicOnly => "allow_public_only",
        }
    }
}

impl fmt::Display for IpBlockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IpBlockMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "none" => Ok(Self::None),
            "allow_private_only" => Ok(Self::AllowPrivateOnly),
            "allow_public_only" => Ok(Self::AllowPublicOnly),
            _ => Err(EngineError::validation(format!(
                "Invalid ip_block_mode: '{s}'. Expected one of: none, allow_private_only, allow_public_only"
            ))),
        }
    }
}

/// The axis along which concurrent sessions are grouped for limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitDimension {
    /// No concurrency limiting.
    None,
    /// All of the user's sessions count against one limit.
    User,
    /// Sessions are grouped by source IP address.
    Ip,
    /// Sessions are grouped by the resolved country of the source IP.
    Country,
    /// Sessions are grouped by device class.
    DeviceClass,
    /// Sessions are grouped by device type.
    DeviceType,
    /// Sessions are grouped by client category.
    DeviceClient,
    /// Sessions are grouped by browser name.
    DeviceBrowser,
    /// Sessions are grouped by operating system name.
    DeviceOs,
}

impl Default for LimitDimension {
    fn default() -> Self {
        Self::None
    }
}

impl LimitDimension {
    /// Return the dimension as its configuration string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::User => "user",
            Self::Ip => "ip",
            Self::Country => "country",
            Self::DeviceClass => "device_class",
            Self::DeviceType => "device_type",
            Self::DeviceClient => "device_client",
            Self::DeviceBrowser => "device_browser",
            Self::DeviceOs => "device_os",
        }
    }
}

impl fmt::Display for LimitDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LimitDimension {
    type Err = EngineError;

    /// Accepts both snake_case and the legacy hyphenated spellings
    /// (`device_os` and `device-os`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "none" => Ok(Self::None),
            "user" => Ok(Self::User),
            "ip" => Ok(Self::Ip),
            "country" => Ok(Self::Country),
            "device_class" => Ok(Self::DeviceClass),
            "device_type" => Ok(Self::DeviceType),
            "device_client" => Ok(Self::DeviceClient),
            "device_browser" => Ok(Self::DeviceBrowser),
            "device_os" => Ok(Self::DeviceOs),
            _ => Err(EngineError::validation(format!(
                "Invalid limit_dimension: '{s}'"
            ))),
        }
    }
}

/// Policy choice applied when a limit is exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowMethod {
    /// Evict the victim session(s) and admit the new login.
    EvictOldest,
    /// Refuse the new login; existing sessions are untouched.
    Deny,
}

impl Default for OverflowMethod {
    fn default() -> Self {
        Self::Deny
    }
}

impl fmt::Display for OverflowMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EvictOldest => write!(f, "evict_oldest"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

impl FromStr for OverflowMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "evict_oldest" => Ok(Self::EvictOldest),
            "deny" => Ok(Self::Deny),
            _ => Err(EngineError::validation(format!(
                "Invalid overflow_method: '{s}'. Expected one of: evict_oldest, deny"
            ))),
        }
    }
}

/// Cookie lifetime pair exposed to the host's cookie machinery.
///
/// The engine owns no cookie mechanics; it only reports the durations the
/// resolved policy prescribes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieTtls {
    /// Lifetime of a regular login cookie.
    pub ttl: Duration,
    /// Lifetime of a "remember me" login cookie.
    pub remember_ttl: Duration,
}

/// A role's concurrency policy, immutable per evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// IP-range admission rule, checked before dimension limiting.
    pub ip_block_mode: IpBlockMode,
    /// Grouping axis for concurrency limiting.
    pub limit_dimension: LimitDimension,
    /// Maximum concurrent sessions within one dimension group.
    /// Meaningless (and zero) when `limit_dimension` is `None`.
    pub limit_count: u32,
    /// What to do when the limit is exceeded.
    pub overflow_method: OverflowMethod,
    /// Hours of inactivity before a session idle-expires. `0` disables
    /// idle expiry.
    pub idle_timeout_hours: u32,
    /// Regular login cookie lifetime in hours.
    pub cookie_ttl_hours: u64,
    /// "Remember me" cookie lifetime in hours.
    pub cookie_remember_ttl_hours: u64,
}

impl Policy {
    /// Whether this policy performs any dimension limiting at all.
    pub fn limits_sessions(&self) -> bool {
        self.limit_dimension != LimitDimension::None
    }

    /// The cookie lifetimes this policy prescribes.
    pub fn cookie_ttls(&self) -> CookieTtls {
        CookieTtls {
            ttl: Duration::hours(self.cookie_ttl_hours as i64),
            remember_ttl: Duration::hours(self.cookie_remember_ttl_hours as i64),
        }
    }
}
