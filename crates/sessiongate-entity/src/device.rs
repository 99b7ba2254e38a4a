//! Device information extracted from a user-agent string.

use serde::{Deserialize, Serialize};

/// Fallback attribute value when classification cannot produce one.
pub const UNKNOWN_ATTRIBUTE: &str = "unknown";

/// Categorical device dimensions parsed from a user-agent string.
///
/// Every attribute is a small enumerated value rendered as a lowercase
/// string, with `"unknown"` as the universal fallback:
///
/// - `class`: `human` or `bot`
/// - `device_type`: `desktop`, `mobile`, or `tablet`
/// - `client`: `browser`, `app`, or `crawler`
/// - `browser`: browser product name (`chrome`, `firefox`, ...)
/// - `os`: operating system name (`windows`, `ios`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Agent class.
    pub class: String,
    /// Hardware form factor.
    pub device_type: String,
    /// Client software category.
    pub client: String,
    /// Browser product name.
    pub browser: String,
    /// Operating system name.
    pub os: String,
}

impl DeviceInfo {
    /// A record with every attribute set to `"unknown"`.
    pub fn unknown() -> Self {
        Self {
            class: UNKNOWN_ATTRIBUTE.to_string(),
            device_type: UNKNOWN_ATTRIBUTE.to_string(),
            client: UNKNOWN_ATTRIBUTE.to_string(),
            browser: UNKNOWN_ATTRIBUTE.to_string(),
            os: UNKNOWN_ATTRIBUTE.to_string(),
        }
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::unknown()
    }
}
