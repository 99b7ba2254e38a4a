//! Dimension grouping keys.

use std::net::IpAddr;

/// The grouping key a session maps to under a limiting dimension.
///
/// One generic limiter routine handles every dimension; only the key
/// extraction differs. The `User` variant is the identity key — every
/// session of the user maps to it, which makes the dimension limiter
/// collapse into the per-user base case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DimensionKey {
    /// Identity key: all sessions of the user share it.
    User,
    /// Grouped by source IP address.
    Ip(IpAddr),
    /// Grouped by resolved country code (`"unknown"` when unresolvable).
    Country(String),
    /// Grouped by a device attribute value (`"unknown"` when the
    /// classifier cannot produce one).
    Device(String),
}
