//! Role resolution.

/// Resolve the policy-bearing role for a user.
///
/// Returns the first entry of `known_roles` that also appears among the
/// user's roles. Determinism rests entirely on `known_roles` order, which
/// the catalog guarantees to be its configuration order.
pub fn resolve_role<'a>(user_roles: &[String], known_roles: &'a [String]) -> Option<&'a str> {
    known_roles
        .iter()
        .find(|known| user_roles.iter().any(|held| held == *known))
        .map(String::as_str)
}
