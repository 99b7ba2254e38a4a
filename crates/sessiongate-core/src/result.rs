//! Convenience result type alias for SessionGate.

use crate::error::EngineError;

/// A specialized `Result` type for SessionGate operations.
///
/// This is defined as a convenience so that every crate does not need to
/// write `Result<T, EngineError>` explicitly.
pub type EngineResult<T> = Result<T, EngineError>;
