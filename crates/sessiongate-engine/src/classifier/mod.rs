//! User-agent classification into device dimensions.

pub mod parser;

use sessiongate_core::EngineResult;
use sessiongate_entity::DeviceInfo;

/// Maps a user-agent string to categorical device dimension values.
///
/// A failing implementation never aborts an evaluation: the caller degrades
/// the affected dimension key to `"unknown"` instead.
pub trait DeviceClassifier: Send + Sync {
    /// Classify a user-agent string.
    fn classify(&self, user_agent: &str) -> EngineResult<DeviceInfo>;
}

/// Built-in dependency-free user-agent classifier.
///
/// Covers the mainstream browser/OS landscape with ordered substring
/// checks; anything it cannot recognize comes back as `"unknown"` rather
/// than an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct UaClassifier;

impl UaClassifier {
    /// Create a new classifier.
    pub fn new() -> Self {
        Self
    }
}

impl DeviceClassifier for UaClassifier {
    fn classify(&self, user_agent: &str) -> EngineResult<DeviceInfo> {
        Ok(parser::parse_user_agent(user_agent))
    }
}
