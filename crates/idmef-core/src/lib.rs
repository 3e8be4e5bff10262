//! # idmef-core: Foundational Types for IDMEFv2
//!
//! This crate is the leaf of the workspace. It defines the message model and
//! the error taxonomy that every other crate shares. It knows nothing about
//! schemas on disk or which codecs exist.
//!
//! ## Key Types
//!
//! - [`Message`]: an ordered field mapping representing one event record.
//!   A message is a bag of unvalidated fields until it passes validation
//!   against the schema resolved from its own `Version` field.
//! - [`SerializedPayload`]: an immutable `(content type, bytes)` pair.
//! - [`VersionToken`]: the minor-version digits extracted from `Version`
//!   through the fixed `<major>.D.V<minor>` grammar.
//! - [`IdmefError`]: the single error type surfaced to callers.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `idmef-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod message;
pub mod payload;
pub mod version;

pub use error::{IdmefError, SerializationError, ValidationViolations, Violation};
pub use message::{FieldMap, Message, VERSION_FIELD};
pub use payload::SerializedPayload;
pub use version::VersionToken;

/// Convenience alias used across the workspace.
pub type Result<T, E = IdmefError> = std::result::Result<T, E>;
