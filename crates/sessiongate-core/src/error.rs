//! Unified error types for SessionGate.
//!
//! All crates map their internal errors into [`EngineError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Policy or engine configuration is missing or malformed.
    Configuration,
    /// Input validation failed.
    Validation,
    /// The session store failed to load or persist a session set.
    Store,
    /// The device classifier failed to parse a user agent.
    Classifier,
    /// The geo resolver failed to resolve an address.
    Geo,
    /// A session-related error occurred.
    Session,
    /// An internal engine error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Store => write!(f, "STORE"),
            Self::Classifier => write!(f, "CLASSIFIER"),
            Self::Geo => write!(f, "GEO"),
            Self::Session => write!(f, "SESSION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified error type used throughout SessionGate.
///
/// Crate-specific failures are mapped into `EngineError` using `From` impls
/// or explicit `.map_err()` calls, so callers deal with a single error type
/// at the engine boundary. A `Store` kind is fatal for the evaluation that
/// produced it; `Classifier` and `Geo` kinds are degradable and never abort
/// an evaluation on their own.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl EngineError {
    /// Create a new engine error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new engine error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store, message)
    }

    /// Create a classifier error.
    pub fn classifier(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Classifier, message)
    }

    /// Create a geo resolution error.
    pub fn geo(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Geo, message)
    }

    /// Create a session error.
    pub fn session(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Session, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for EngineError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
