//! # Codec Capability
//!
//! A codec encodes a message's field set into bytes and decodes bytes back
//! into a field mapping, for exactly one content type.
//!
//! ## Contract
//!
//! - `encode` is a pure function of the current fields. It reports only
//!   encoder faults; validation is the caller's job and happens first.
//! - `decode` parses bytes into a field mapping without schema validation.
//!   The result need not be a valid message.
//! - For any message that validates, `decode(encode(m))` yields a mapping
//!   equal to `m`'s fields. Codec-specific representational quirks must be
//!   documented on the codec.

use std::fmt;
use std::sync::Arc;

use idmef_core::{FieldMap, Message, SerializationError};
use thiserror::Error;

/// Encoder/decoder for one content type.
pub trait Codec: Send + Sync {
    /// The MIME content type this codec handles.
    fn content_type(&self) -> &str;

    /// Serialize the message's fields.
    fn encode(&self, message: &Message) -> Result<Vec<u8>, SerializationError>;

    /// Parse a payload into a field mapping.
    fn decode(&self, payload: &[u8]) -> Result<FieldMap, SerializationError>;
}

/// A codec could not be instantiated.
#[derive(Error, Debug)]
pub enum CodecLoadError {
    /// The factory ran but could not produce a codec.
    #[error("codec {name} unavailable: {reason}")]
    Unavailable {
        /// Registration name.
        name: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The configuration named a codec kind that is not compiled in.
    #[error("unknown codec kind {0:?}")]
    UnknownKind(String),
}

/// Factory producing a fresh codec instance.
pub type CodecFactory = Arc<dyn Fn() -> Result<Box<dyn Codec>, CodecLoadError> + Send + Sync>;

/// One entry of the codec extension point.
#[derive(Clone)]
pub struct CodecRegistration {
    content_type: String,
    name: String,
    factory: CodecFactory,
}

impl fmt::Debug for CodecRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistration")
            .field("content_type", &self.content_type)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl CodecRegistration {
    /// Register `factory` under `content_type`.
    pub fn new<F>(content_type: impl Into<String>, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Codec>, CodecLoadError> + Send + Sync + 'static,
    {
        Self {
            content_type: content_type.into(),
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// The content type this registration serves.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Human-readable name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the factory.
    pub fn instantiate(&self) -> Result<Box<dyn Codec>, CodecLoadError> {
        (self.factory)()
    }
}
