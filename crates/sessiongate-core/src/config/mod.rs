//! Engine configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate, with a `SESSIONGATE_`-prefixed environment overlay.

pub mod engine;
pub mod limits;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub use self::engine::{EngineSettings, EvictionMode, Strictness};
pub use self::limits::{LimitsConfig, RolePolicy};

/// Root engine configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration file and environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Engine-wide behavior settings.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Per-role limit policies.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// Merges the named file (optional) with environment variables prefixed
    /// with `SESSIONGATE_`, using `__` as the section separator, e.g.
    /// `SESSIONGATE_ENGINE__STRICTNESS=strict`.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SESSIONGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(EngineError::from)
    }
}
