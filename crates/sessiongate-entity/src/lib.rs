//! # sessiongate-entity
//!
//! Domain entity models for SessionGate. Every struct in this crate is a
//! plain value object: persistence schema and transport are collaborator
//! concerns, so entities derive only `Debug`, `Clone`, `Serialize`, and
//! `Deserialize`.

pub mod device;
pub mod session;

pub use device::DeviceInfo;
pub use session::{SessionRecord, SessionSet};
