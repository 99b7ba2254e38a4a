//! # sessiongate-engine
//!
//! The SessionGate policy engine: given a user's active sessions and a
//! role-based policy, decide whether a new login proceeds, which sessions
//! must be evicted to make room, or whether the login is refused.
//!
//! ## Modules
//!
//! - `classifier` — user-agent classification into device dimensions
//! - `geo` — IP-to-country resolution and private-range classification
//! - `gate` — IP-range admission rule
//! - `limiter` — generic dimension limiter and per-user base case
//! - `policy` — policy catalog and role resolution
//! - `session` — evaluation orchestration, idle tracking, reaping, storage
//! - `notify` — fire-and-forget termination notifications

pub mod classifier;
pub mod gate;
pub mod geo;
pub mod limiter;
pub mod notify;
pub mod policy;
pub mod session;

pub use classifier::{DeviceClassifier, UaClassifier};
pub use gate::IpGate;
pub use geo::{CidrGeoResolver, GeoResolver};
pub use limiter::{DimensionLimiter, LimitOutcome, TrimPlan};
pub use notify::{Notifier, TracingNotifier};
pub use policy::{ConfigPolicyCatalog, PolicyCatalog};
pub use session::{MemorySessionStore, SessionEvaluator, SessionStore, SweepStats};
