//! IP-range admission rule.
//!
//! Runs before any dimension limiting: a login from an address outside the
//! policy's allowed range is refused outright, regardless of session counts.

use std::net::IpAddr;

use tracing::warn;

use sessiongate_core::types::IpBlockMode;

use crate::geo::GeoResolver;

/// Result of the IP-range admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The address passes the admission rule.
    Allow,
    /// The address is outside the allowed range.
    Deny,
}

/// The IP-range admission gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct IpGate;

impl IpGate {
    /// Evaluate the admission rule for a candidate address.
    pub fn evaluate(mode: IpBlockMode, ip: IpAddr, geo: &dyn GeoResolver) -> GateDecision {
        let decision = match mode {
            IpBlockMode::None => GateDecision::Allow,
            IpBlockMode::AllowPrivateOnly => {
                if geo.is_private(ip) {
                    GateDecision::Allow
                } else {
                    GateDecision::Deny
                }
            }
            IpBlockMode::AllowPublicOnly => {
                if geo.is_private(ip) {
                    GateDecision::Deny
                } else {
                    GateDecision::Allow
                }
            }
        };

        if decision == GateDecision::Deny {
            warn!(ip = %ip, mode = %mode, "Login blocked by IP-range rule");
        }

        decision
    }
}
