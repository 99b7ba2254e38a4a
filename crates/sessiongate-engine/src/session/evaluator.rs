//! Login evaluation orchestration.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use sessiongate_core::config::{EngineSettings, EvictionMode, Strictness};
use sessiongate_core::types::{CookieTtls, DenyReason, OverflowMethod, Policy, PolicyContext, Verdict};
use sessiongate_core::{EngineError, EngineResult};
use sessiongate_entity::SessionRecord;

use crate::classifier::DeviceClassifier;
use crate::gate::{GateDecision, IpGate};
use crate::geo::GeoResolver;
use crate::limiter::{DimensionLimiter, LimitOutcome, key};
use crate::notify::Notifier;
use crate::policy::{PolicyCatalog, resolve_role};

use super::reaper::{self, SweepStats};
use super::store::SessionStore;
use super::idle;

/// The top-level session limiting orchestrator.
///
/// One evaluation runs IP gating, dimension limiting, and overflow
/// resolution as a single atomic decision-and-mutation unit for the user:
/// concurrent evaluations for the same user are serialized on a per-user
/// mutex, while different users proceed in parallel. All evaluation context
/// arrives as explicit parameters; the evaluator holds no per-request state.
#[derive(Clone)]
pub struct SessionEvaluator {
    /// Session persistence.
    store: Arc<dyn SessionStore>,
    /// Role-to-policy catalog.
    catalog: Arc<dyn PolicyCatalog>,
    /// User-agent classification for device dimensions.
    classifier: Arc<dyn DeviceClassifier>,
    /// Country resolution and private-range classification.
    geo: Arc<dyn GeoResolver>,
    /// Termination notification hooks.
    notifier: Arc<dyn Notifier>,
    /// Engine-wide behavior settings.
    settings: EngineSettings,
    /// Per-user evaluation locks.
    user_locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for SessionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEvaluator")
            .field("settings", &self.settings)
            .finish()
    }
}

impl SessionEvaluator {
    /// Create an evaluator with all required collaborators.
    pub fn new(
        store: Arc<dyn SessionStore>,
        catalog: Arc<dyn PolicyCatalog>,
        classifier: Arc<dyn DeviceClassifier>,
        geo: Arc<dyn GeoResolver>,
        notifier: Arc<dyn Notifier>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            catalog,
            classifier,
            geo,
            notifier,
            settings,
            user_locks: Arc::new(DashMap::new()),
        }
    }

    /// Evaluate a login attempt.
    ///
    /// The flow is: resolve role and policy, run the IP-range gate, run the
    /// dimension limiter, resolve overflow. Every session-set mutation is
    /// persisted before the verdict returns, with one forced-termination
    /// notification per session actually removed. Under
    /// `overflow_method = deny` nothing is ever mutated.
    ///
    /// A store failure aborts the evaluation with an error; the candidate
    /// is neither admitted nor refused on a session set the engine could
    /// not read or write.
    pub async fn evaluate_login(
        &self,
        user_id: Uuid,
        user_roles: &[String],
        candidate_ip: IpAddr,
        candidate_user_agent: Option<&str>,
        now: DateTime<Utc>,
    ) -> EngineResult<Verdict> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        // Resolve the policy-bearing role.
        let Some((role, policy)) = self.resolve_policy(user_roles) else {
            return Ok(self.missing_policy_verdict(user_id, user_roles));
        };

        // IP-range admission rule runs before any limiting.
        if IpGate::evaluate(policy.ip_block_mode, candidate_ip, self.geo.as_ref())
            == GateDecision::Deny
        {
            return Ok(Verdict::Denied {
                reason: DenyReason::IpRangeBlocked,
                context: policy_context(&role, &policy),
            });
        }

        if !policy.limits_sessions() {
            return Ok(Verdict::Allowed);
        }

        // Load the current set and drop anything already expired so stale
        // records never count against the limit.
        let sessions = self.store.load(user_id).await?;
        let swept = reaper::sweep(&sessions, now);
        if swept.terminated() > 0 {
            self.store.save(user_id, &swept.remaining).await?;
            self.notify_sweep(user_id, &swept);
        }
        let mut sessions = swept.remaining;

        let dimension = policy.limit_dimension;
        let candidate_key = key::key_for(
            dimension,
            candidate_ip,
            candidate_user_agent,
            self.classifier.as_ref(),
            self.geo.as_ref(),
        );
        let key_of = |record: &SessionRecord| {
            key::record_key(dimension, record, self.classifier.as_ref(), self.geo.as_ref())
        };

        let plan = match self.settings.eviction_mode {
            EvictionMode::Chained => DimensionLimiter::evaluate(
                &sessions,
                &candidate_key,
                policy.limit_count,
                key_of,
            ),
            EvictionMode::Minimal => DimensionLimiter::evaluate_minimal(
                &sessions,
                &candidate_key,
                policy.limit_count,
                key_of,
            ),
        };

        match plan.outcome {
            LimitOutcome::Allow => Ok(Verdict::Allowed),
            LimitOutcome::Evict(victim) => match policy.overflow_method {
                OverflowMethod::Deny => {
                    info!(
                        user_id = %user_id,
                        role = %role,
                        dimension = %dimension,
                        limit = policy.limit_count,
                        "Login denied: session limit reached"
                    );
                    Ok(Verdict::Denied {
                        reason: DenyReason::LimitExceeded,
                        context: policy_context(&role, &policy),
                    })
                }
                OverflowMethod::EvictOldest => {
                    let mut evicted = Vec::new();

                    // Apply the plan's removals and the named victim in
                    // order, persisting after each removal. The victim may
                    // already be gone; removal is idempotent.
                    for token in plan.removals.iter().chain(std::iter::once(&victim)) {
                        if sessions.remove(token).is_some() {
                            self.store.save(user_id, &sessions).await?;
                            self.notifier.on_forced_terminate(user_id);
                            evicted.push(token.clone());
                        }
                    }

                    info!(
                        user_id = %user_id,
                        role = %role,
                        dimension = %dimension,
                        limit = policy.limit_count,
                        evicted = evicted.len(),
                        "Evicted session(s) to admit login"
                    );

                    Ok(Verdict::EvictedThenAllowed {
                        evicted,
                        context: policy_context(&role, &policy),
                    })
                }
            },
        }
    }

    /// Refresh the idle-expiry deadline of one session.
    ///
    /// Called once per request cycle for the session tied to the currently
    /// authenticated requester.
    pub async fn refresh_idle(
        &self,
        user_id: Uuid,
        user_roles: &[String],
        token: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let Some((_, policy)) = self.resolve_policy(user_roles) else {
            return match self.settings.strictness {
                Strictness::Strict => Err(EngineError::configuration(
                    "No usable session policy for the user's roles",
                )),
                Strictness::Lenient => {
                    warn!(user_id = %user_id, "No usable session policy; idle refresh skipped");
                    Ok(())
                }
            };
        };

        let mut sessions = self.store.load(user_id).await?;
        let Some(record) = sessions.get_mut(token) else {
            return Err(EngineError::session(format!(
                "Unknown session token for user {user_id}"
            )));
        };

        idle::refresh_idle_expiry(record, policy.idle_timeout_hours, now);
        self.store.save(user_id, &sessions).await
    }

    /// Sweep a user's sessions, removing idle-expired and absolute-expired
    /// entries.
    pub async fn reap(&self, user_id: Uuid, now: DateTime<Utc>) -> EngineResult<SweepStats> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let sessions = self.store.load(user_id).await?;
        let stats = reaper::sweep(&sessions, now);

        if stats.terminated() > 0 {
            self.store.save(user_id, &stats.remaining).await?;
            self.notify_sweep(user_id, &stats);
            info!(
                user_id = %user_id,
                idle = stats.idle_terminated,
                expired = stats.expired_terminated,
                "Session sweep completed"
            );
        }

        Ok(stats)
    }

    /// The cookie lifetimes prescribed by the user's resolved policy, if
    /// one exists. Cookie issuance itself is the host's concern.
    pub fn cookie_ttls(&self, user_roles: &[String]) -> Option<CookieTtls> {
        self.resolve_policy(user_roles)
            .map(|(_, policy)| policy.cookie_ttls())
    }

    fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.user_locks.entry(user_id).or_default().clone()
    }

    fn resolve_policy(&self, user_roles: &[String]) -> Option<(String, Policy)> {
        let role = resolve_role(user_roles, self.catalog.known_roles())?;
        let policy = self.catalog.policy_for(role)?;
        Some((role.to_string(), policy))
    }

    fn missing_policy_verdict(&self, user_id: Uuid, user_roles: &[String]) -> Verdict {
        match self.settings.strictness {
            Strictness::Strict => Verdict::Misconfigured {
                reason: format!("No usable session policy for roles {user_roles:?}"),
            },
            Strictness::Lenient => {
                warn!(
                    user_id = %user_id,
                    roles = ?user_roles,
                    "No usable session policy; admitting login"
                );
                Verdict::Allowed
            }
        }
    }

    fn notify_sweep(&self, user_id: Uuid, stats: &SweepStats) {
        if stats.idle_terminated > 0 {
            self.notifier.on_idle_terminate(user_id);
        }
        if stats.expired_terminated > 0 {
            self.notifier.on_expired_terminate(user_id);
        }
    }
}

fn policy_context(role: &str, policy: &Policy) -> PolicyContext {
    PolicyContext {
        role: role.to_string(),
        dimension: policy.limit_dimension,
        limit: policy.limits_sessions().then_some(policy.limit_count),
    }
}
