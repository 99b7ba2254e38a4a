//! Policy catalog backed by configuration.

use std::collections::HashMap;

use tracing::warn;

use sessiongate_core::config::LimitsConfig;
use sessiongate_core::types::Policy;

/// Maps a role identifier to its concurrency policy.
///
/// `known_roles` must enumerate in a stable, documented order — it defines
/// role resolution priority (first match wins).
pub trait PolicyCatalog: Send + Sync {
    /// The policy for a role, if one is configured and valid.
    fn policy_for(&self, role: &str) -> Option<Policy>;

    /// All roles with a usable policy, in resolution priority order.
    fn known_roles(&self) -> &[String];
}

/// Catalog built from the `[[limits.roles]]` configuration entries.
///
/// Enumeration order is the configuration order. Entries that fail
/// validation are dropped with a warning instead of failing construction;
/// a role whose entry was dropped has no policy, so evaluation treats it
/// exactly like a role that was never configured.
#[derive(Debug, Clone, Default)]
pub struct ConfigPolicyCatalog {
    roles: Vec<String>,
    policies: HashMap<String, Policy>,
}

impl ConfigPolicyCatalog {
    /// Build the catalog from configuration.
    pub fn from_config(config: &LimitsConfig) -> Self {
        let mut roles = Vec::new();
        let mut policies = HashMap::new();

        for entry in &config.roles {
            if policies.contains_key(&entry.role) {
                warn!(role = %entry.role, "Duplicate role policy entry ignored");
                continue;
            }

            match entry.validate() {
                Ok(policy) => {
                    roles.push(entry.role.clone());
                    policies.insert(entry.role.clone(), policy);
                }
                Err(e) => {
                    warn!(role = %entry.role, error = %e, "Dropping invalid role policy entry");
                }
            }
        }

        Self { roles, policies }
    }

    /// Number of usable role policies.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether the catalog holds no usable policy.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl PolicyCatalog for ConfigPolicyCatalog {
    fn policy_for(&self, role: &str) -> Option<Policy> {
        self.policies.get(role).cloned()
    }

    fn known_roles(&self) -> &[String] {
        &self.roles
    }
}
