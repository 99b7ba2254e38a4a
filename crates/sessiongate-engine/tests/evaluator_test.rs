//! End-to-end evaluation scenarios against the in-memory store.

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use sessiongate_core::config::{EngineSettings, EvictionMode, LimitsConfig, RolePolicy, Strictness};
use sessiongate_core::error::ErrorKind;
use sessiongate_core::types::{DenyReason, LimitDimension, Verdict};
use sessiongate_core::{EngineError, EngineResult};
use sessiongate_engine::classifier::{DeviceClassifier, UaClassifier};
use sessiongate_engine::geo::CidrGeoResolver;
use sessiongate_engine::notify::Notifier;
use sessiongate_engine::policy::ConfigPolicyCatalog;
use sessiongate_engine::session::{MemorySessionStore, SessionEvaluator, SessionStore};
use sessiongate_entity::{DeviceInfo, SessionRecord, SessionSet};

/// Notifier that counts invocations per hook.
#[derive(Debug, Default)]
struct CountingNotifier {
    forced: AtomicU32,
    idle: AtomicU32,
    expired: AtomicU32,
}

impl Notifier for CountingNotifier {
    fn on_forced_terminate(&self, _user_id: Uuid) {
        self.forced.fetch_add(1, Ordering::SeqCst);
    }

    fn on_idle_terminate(&self, _user_id: Uuid) {
        self.idle.fetch_add(1, Ordering::SeqCst);
    }

    fn on_expired_terminate(&self, _user_id: Uuid) {
        self.expired.fetch_add(1, Ordering::SeqCst);
    }
}

/// Store whose every call fails, for fatal-path coverage.
#[derive(Debug)]
struct UnavailableStore;

#[async_trait]
impl SessionStore for UnavailableStore {
    async fn load(&self, _user_id: Uuid) -> EngineResult<SessionSet> {
        Err(EngineError::store("backing store unreachable"))
    }

    async fn save(&self, _user_id: Uuid, _sessions: &SessionSet) -> EngineResult<()> {
        Err(EngineError::store("backing store unreachable"))
    }
}

/// Classifier that always fails, for degrade-path coverage.
#[derive(Debug)]
struct BrokenClassifier;

impl DeviceClassifier for BrokenClassifier {
    fn classify(&self, _user_agent: &str) -> EngineResult<DeviceInfo> {
        Err(EngineError::classifier("classifier database unavailable"))
    }
}

struct Harness {
    evaluator: SessionEvaluator,
    store: Arc<MemorySessionStore>,
    notifier: Arc<CountingNotifier>,
}

fn role_entry(
    role: &str,
    ip_block_mode: &str,
    dimension: &str,
    count: u32,
    overflow: &str,
) -> RolePolicy {
    RolePolicy {
        role: role.to_string(),
        ip_block_mode: ip_block_mode.to_string(),
        limit_dimension: dimension.to_string(),
        limit_count: count,
        overflow_method: overflow.to_string(),
        idle_timeout_hours: 8,
        cookie_ttl_hours: 48,
        cookie_remember_ttl_hours: 336,
    }
}

fn harness(entries: Vec<RolePolicy>, settings: EngineSettings) -> Harness {
    tracing_subscriber::fmt()
        .with_env_filter("sessiongate_engine=debug")
        .with_test_writer()
        .try_init()
        .ok();

    let store = Arc::new(MemorySessionStore::new());
    let catalog = Arc::new(ConfigPolicyCatalog::from_config(&LimitsConfig { roles: entries }));
    let notifier = Arc::new(CountingNotifier::default());

    let evaluator = SessionEvaluator::new(
        store.clone(),
        catalog,
        Arc::new(UaClassifier::new()),
        Arc::new(CidrGeoResolver::new()),
        notifier.clone(),
        settings,
    );

    Harness {
        evaluator,
        store,
        notifier,
    }
}

fn chained() -> EngineSettings {
    EngineSettings {
        strictness: Strictness::Lenient,
        eviction_mode: EvictionMode::Chained,
    }
}

fn minimal() -> EngineSettings {
    EngineSettings {
        strictness: Strictness::Lenient,
        eviction_mode: EvictionMode::Minimal,
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn record(token: &str, minute: u32, ip: &str) -> SessionRecord {
    SessionRecord::new(
        token,
        t0() + Duration::minutes(minute as i64),
        ip.parse::<IpAddr>().unwrap(),
        None,
    )
}

async fn seed(store: &MemorySessionStore, user_id: Uuid, records: Vec<SessionRecord>) {
    let set: SessionSet = records.into_iter().collect();
    store.save(user_id, &set).await.unwrap();
}

fn roles(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

const IP_A: &str = "203.0.113.1";
const NOW_MINUTE: u32 = 30;

#[tokio::test]
async fn test_below_limit_allows_untouched() {
    let h = harness(
        vec![role_entry("editor", "none", "ip", 2, "evict_oldest")],
        chained(),
    );
    let user_id = Uuid::new_v4();
    seed(&h.store, user_id, vec![record("t1", 0, IP_A)]).await;

    let verdict = h
        .evaluator
        .evaluate_login(
            user_id,
            &roles(&["editor"]),
            IP_A.parse().unwrap(),
            None,
            t0() + Duration::minutes(NOW_MINUTE as i64),
        )
        .await
        .unwrap();

    assert_eq!(verdict, Verdict::Allowed);
    assert_eq!(h.store.load(user_id).await.unwrap().len(), 1);
    assert_eq!(h.notifier.forced.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_other_ip_sessions_do_not_count() {
    let h = harness(
        vec![role_entry("editor", "none", "ip", 1, "deny")],
        chained(),
    );
    let user_id = Uuid::new_v4();
    seed(
        &h.store,
        user_id,
        vec![record("t1", 0, "198.51.100.7"), record("t2", 1, "198.51.100.8")],
    )
    .await;

    let verdict = h
        .evaluator
        .evaluate_login(
            user_id,
            &roles(&["editor"]),
            IP_A.parse().unwrap(),
            None,
            t0() + Duration::minutes(NOW_MINUTE as i64),
        )
        .await
        .unwrap();

    assert_eq!(verdict, Verdict::Allowed);
}

#[tokio::test]
async fn test_evict_oldest_on_same_ip_chained() {
    let h = harness(
        vec![role_entry("editor", "none", "ip", 2, "evict_oldest")],
        chained(),
    );
    let user_id = Uuid::new_v4();
    seed(
        &h.store,
        user_id,
        vec![record("t1", 0, IP_A), record("t2", 1, IP_A), record("t3", 2, IP_A)],
    )
    .await;

    let verdict = h
        .evaluator
        .evaluate_login(
            user_id,
            &roles(&["editor"]),
            IP_A.parse().unwrap(),
            None,
            t0() + Duration::minutes(NOW_MINUTE as i64),
        )
        .await
        .unwrap();

    // The oldest session goes; the chained pass also evicts the next
    // surviving victim it names.
    let Verdict::EvictedThenAllowed { evicted, context } = verdict else {
        panic!("expected EvictedThenAllowed, got {verdict:?}");
    };
    assert_eq!(evicted, vec!["t1".to_string(), "t2".to_string()]);
    assert_eq!(context.dimension, LimitDimension::Ip);
    assert_eq!(context.limit, Some(2));
    assert_eq!(context.role, "editor");

    let remaining = h.store.load(user_id).await.unwrap();
    assert!(!remaining.contains("t1"));
    assert!(remaining.contains("t3"));
    assert_eq!(h.notifier.forced.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_evict_oldest_on_same_ip_minimal() {
    let h = harness(
        vec![role_entry("editor", "none", "ip", 2, "evict_oldest")],
        minimal(),
    );
    let user_id = Uuid::new_v4();
    seed(
        &h.store,
        user_id,
        vec![record("t1", 0, IP_A), record("t2", 1, IP_A), record("t3", 2, IP_A)],
    )
    .await;

    let verdict = h
        .evaluator
        .evaluate_login(
            user_id,
            &roles(&["editor"]),
            IP_A.parse().unwrap(),
            None,
            t0() + Duration::minutes(NOW_MINUTE as i64),
        )
        .await
        .unwrap();

    let Verdict::EvictedThenAllowed { evicted, .. } = verdict else {
        panic!("expected EvictedThenAllowed, got {verdict:?}");
    };
    assert_eq!(evicted, vec!["t1".to_string()]);

    let remaining = h.store.load(user_id).await.unwrap();
    assert!(remaining.contains("t2"));
    assert!(remaining.contains("t3"));
    assert_eq!(h.notifier.forced.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_deny_overflow_mutates_nothing() {
    let h = harness(
        vec![role_entry("editor", "none", "ip", 2, "deny")],
        chained(),
    );
    let user_id = Uuid::new_v4();
    seed(
        &h.store,
        user_id,
        vec![record("t1", 0, IP_A), record("t2", 1, IP_A), record("t3", 2, IP_A)],
    )
    .await;

    let verdict = h
        .evaluator
        .evaluate_login(
            user_id,
            &roles(&["editor"]),
            IP_A.parse().unwrap(),
            None,
            t0() + Duration::minutes(NOW_MINUTE as i64),
        )
        .await
        .unwrap();

    let Verdict::Denied { reason, context } = verdict else {
        panic!("expected Denied, got {verdict:?}");
    };
    assert_eq!(reason, DenyReason::LimitExceeded);
    assert_eq!(context.limit, Some(2));

    // Nothing was evicted or persisted.
    assert_eq!(h.store.load(user_id).await.unwrap().len(), 3);
    assert_eq!(h.notifier.forced.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_public_ip_blocked_under_private_only() {
    let h = harness(
        vec![role_entry("editor", "allow_private_only", "ip", 2, "evict_oldest")],
        chained(),
    );
    let user_id = Uuid::new_v4();

    let verdict = h
        .evaluator
        .evaluate_login(
            user_id,
            &roles(&["editor"]),
            "8.8.8.8".parse().unwrap(),
            None,
            t0(),
        )
        .await
        .unwrap();

    let Verdict::Denied { reason, .. } = verdict else {
        panic!("expected Denied, got {verdict:?}");
    };
    assert_eq!(reason, DenyReason::IpRangeBlocked);
}

#[tokio::test]
async fn test_private_ip_allowed_under_private_only() {
    let h = harness(
        vec![role_entry("editor", "allow_private_only", "ip", 2, "evict_oldest")],
        chained(),
    );

    let verdict = h
        .evaluator
        .evaluate_login(
            Uuid::new_v4(),
            &roles(&["editor"]),
            "192.168.1.20".parse().unwrap(),
            None,
            t0(),
        )
        .await
        .unwrap();

    assert_eq!(verdict, Verdict::Allowed);
}

#[tokio::test]
async fn test_no_dimension_never_limits() {
    let h = harness(
        vec![role_entry("subscriber", "none", "none", 0, "deny")],
        chained(),
    );
    let user_id = Uuid::new_v4();
    seed(
        &h.store,
        user_id,
        (0..10).map(|i| record(&format!("s{i}"), i, IP_A)).collect(),
    )
    .await;

    let verdict = h
        .evaluator
        .evaluate_login(
            user_id,
            &roles(&["subscriber"]),
            IP_A.parse().unwrap(),
            None,
            t0() + Duration::minutes(NOW_MINUTE as i64),
        )
        .await
        .unwrap();

    assert_eq!(verdict, Verdict::Allowed);
}

#[tokio::test]
async fn test_missing_policy_lenient_allows() {
    let h = harness(
        vec![role_entry("administrator", "none", "user", 1, "deny")],
        chained(),
    );

    let verdict = h
        .evaluator
        .evaluate_login(
            Uuid::new_v4(),
            &roles(&["subscriber"]),
            IP_A.parse().unwrap(),
            None,
            t0(),
        )
        .await
        .unwrap();

    assert_eq!(verdict, Verdict::Allowed);
}

#[tokio::test]
async fn test_missing_policy_strict_is_misconfigured() {
    let settings = EngineSettings {
        strictness: Strictness::Strict,
        eviction_mode: EvictionMode::Chained,
    };
    let h = harness(
        vec![role_entry("administrator", "none", "user", 1, "deny")],
        settings,
    );

    let verdict = h
        .evaluator
        .evaluate_login(
            Uuid::new_v4(),
            &roles(&["subscriber"]),
            IP_A.parse().unwrap(),
            None,
            t0(),
        )
        .await
        .unwrap();

    assert!(matches!(verdict, Verdict::Misconfigured { .. }));
}

#[tokio::test]
async fn test_invalid_overflow_entry_behaves_like_missing_policy() {
    // The invalid entry is dropped at catalog construction, so under
    // strict handling the role evaluates as unconfigured.
    let settings = EngineSettings {
        strictness: Strictness::Strict,
        eviction_mode: EvictionMode::Chained,
    };
    let h = harness(
        vec![role_entry("editor", "none", "ip", 2, "kick_newest")],
        settings,
    );

    let verdict = h
        .evaluator
        .evaluate_login(
            Uuid::new_v4(),
            &roles(&["editor"]),
            IP_A.parse().unwrap(),
            None,
            t0(),
        )
        .await
        .unwrap();

    assert!(matches!(verdict, Verdict::Misconfigured { .. }));
}

#[tokio::test]
async fn test_store_failure_is_fatal() {
    let catalog = Arc::new(ConfigPolicyCatalog::from_config(&LimitsConfig {
        roles: vec![role_entry("editor", "none", "ip", 2, "deny")],
    }));
    let evaluator = SessionEvaluator::new(
        Arc::new(UnavailableStore),
        catalog,
        Arc::new(UaClassifier::new()),
        Arc::new(CidrGeoResolver::new()),
        Arc::new(CountingNotifier::default()),
        chained(),
    );

    let err = evaluator
        .evaluate_login(
            Uuid::new_v4(),
            &roles(&["editor"]),
            IP_A.parse().unwrap(),
            None,
            t0(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Store);
}

#[tokio::test]
async fn test_classifier_failure_degrades_not_aborts() {
    let store = Arc::new(MemorySessionStore::new());
    let catalog = Arc::new(ConfigPolicyCatalog::from_config(&LimitsConfig {
        roles: vec![role_entry("editor", "none", "device_os", 2, "evict_oldest")],
    }));
    let notifier = Arc::new(CountingNotifier::default());
    let evaluator = SessionEvaluator::new(
        store.clone(),
        catalog,
        Arc::new(BrokenClassifier),
        Arc::new(CidrGeoResolver::new()),
        notifier.clone(),
        minimal(),
    );

    let user_id = Uuid::new_v4();
    let mut r1 = record("t1", 0, IP_A);
    r1.user_agent = Some("AgentOne/1.0".to_string());
    let mut r2 = record("t2", 1, IP_A);
    r2.user_agent = Some("AgentTwo/2.0".to_string());
    seed(&store, user_id, vec![r1, r2]).await;

    // Every session groups under "unknown", so the group is full and the
    // oldest is evicted — the broken classifier never surfaces as an error.
    let verdict = evaluator
        .evaluate_login(
            user_id,
            &roles(&["editor"]),
            IP_A.parse().unwrap(),
            Some("AgentThree/3.0"),
            t0() + Duration::minutes(NOW_MINUTE as i64),
        )
        .await
        .unwrap();

    let Verdict::EvictedThenAllowed { evicted, .. } = verdict else {
        panic!("expected EvictedThenAllowed, got {verdict:?}");
    };
    assert_eq!(evicted, vec!["t1".to_string()]);
}

#[tokio::test]
async fn test_expired_sessions_do_not_count_against_limit() {
    let h = harness(
        vec![role_entry("editor", "none", "ip", 2, "deny")],
        chained(),
    );
    let user_id = Uuid::new_v4();

    let mut stale1 = record("stale1", 0, IP_A);
    stale1.absolute_expiry = Some(t0() + Duration::minutes(5));
    let mut stale2 = record("stale2", 1, IP_A);
    stale2.absolute_expiry = Some(t0() + Duration::minutes(5));
    seed(&h.store, user_id, vec![stale1, stale2, record("live", 2, IP_A)]).await;

    let verdict = h
        .evaluator
        .evaluate_login(
            user_id,
            &roles(&["editor"]),
            IP_A.parse().unwrap(),
            None,
            t0() + Duration::minutes(NOW_MINUTE as i64),
        )
        .await
        .unwrap();

    // The two expired records were swept, leaving room in the group.
    assert_eq!(verdict, Verdict::Allowed);
    let remaining = h.store.load(user_id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(h.notifier.expired.load(Ordering::SeqCst), 1);
    assert_eq!(h.notifier.forced.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_refresh_idle_sets_and_clears_deadline() {
    let h = harness(
        vec![
            role_entry("editor", "none", "ip", 2, "deny"),
            {
                let mut no_idle = role_entry("viewer", "none", "ip", 2, "deny");
                no_idle.idle_timeout_hours = 0;
                no_idle
            },
        ],
        chained(),
    );
    let user_id = Uuid::new_v4();
    seed(&h.store, user_id, vec![record("t1", 0, IP_A)]).await;

    let now = t0() + Duration::minutes(NOW_MINUTE as i64);
    h.evaluator
        .refresh_idle(user_id, &roles(&["editor"]), "t1", now)
        .await
        .unwrap();

    let sessions = h.store.load(user_id).await.unwrap();
    assert_eq!(
        sessions.get("t1").unwrap().idle_expiry,
        Some(now + Duration::hours(8))
    );

    // A zero-timeout policy clears the deadline again.
    h.evaluator
        .refresh_idle(user_id, &roles(&["viewer"]), "t1", now)
        .await
        .unwrap();
    assert_eq!(h.store.load(user_id).await.unwrap().get("t1").unwrap().idle_expiry, None);
}

#[tokio::test]
async fn test_refresh_idle_unknown_token_is_error() {
    let h = harness(
        vec![role_entry("editor", "none", "ip", 2, "deny")],
        chained(),
    );

    let err = h
        .evaluator
        .refresh_idle(Uuid::new_v4(), &roles(&["editor"]), "ghost", t0())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Session);
}

#[tokio::test]
async fn test_reap_counts_categories_and_is_idempotent() {
    let h = harness(
        vec![role_entry("editor", "none", "ip", 2, "deny")],
        chained(),
    );
    let user_id = Uuid::new_v4();

    let mut idle = record("idle", 0, IP_A);
    idle.idle_expiry = Some(t0() + Duration::minutes(10));
    let mut expired = record("expired", 1, IP_A);
    expired.absolute_expiry = Some(t0() + Duration::minutes(10));
    seed(&h.store, user_id, vec![idle, expired, record("live", 2, IP_A)]).await;

    let now = t0() + Duration::minutes(NOW_MINUTE as i64);
    let stats = h.evaluator.reap(user_id, now).await.unwrap();
    assert_eq!(stats.idle_terminated, 1);
    assert_eq!(stats.expired_terminated, 1);
    assert_eq!(h.notifier.idle.load(Ordering::SeqCst), 1);
    assert_eq!(h.notifier.expired.load(Ordering::SeqCst), 1);

    // Second sweep at the same instant removes nothing further.
    let again = h.evaluator.reap(user_id, now).await.unwrap();
    assert_eq!(again.terminated(), 0);
    assert_eq!(again.remaining, stats.remaining);
    assert_eq!(h.notifier.idle.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cookie_ttls_come_from_resolved_policy() {
    let h = harness(
        vec![role_entry("editor", "none", "ip", 2, "deny")],
        chained(),
    );

    let ttls = h.evaluator.cookie_ttls(&roles(&["editor"])).unwrap();
    assert_eq!(ttls.ttl, Duration::hours(48));
    assert_eq!(ttls.remember_ttl, Duration::hours(336));

    assert!(h.evaluator.cookie_ttls(&roles(&["stranger"])).is_none());
}
