//! YAML codec.
//!
//! Output is block-style YAML. Strings that would read back as another
//! scalar type (`"03"`, `"true"`) are quoted by the encoder, so the field
//! mapping round-trips structurally. Mapping keys must be strings on decode.

use idmef_core::{FieldMap, Message, SerializationError};
use serde_json::Value;

use crate::codec::Codec;
use crate::json::kind;

/// Content type served by default.
pub const YAML_CONTENT_TYPE: &str = "application/yaml";

/// [`Codec`] for YAML payloads.
#[derive(Debug, Clone)]
pub struct YamlCodec {
    content_type: String,
}

impl Default for YamlCodec {
    fn default() -> Self {
        Self::with_content_type(YAML_CONTENT_TYPE)
    }
}

impl YamlCodec {
    /// Codec for `application/yaml`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve YAML under another content type.
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
        }
    }
}

impl Codec for YamlCodec {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn encode(&self, message: &Message) -> Result<Vec<u8>, SerializationError> {
        serde_yaml::to_string(message.fields())
            .map(String::into_bytes)
            .map_err(|e| SerializationError::encode(&self.content_type, e))
    }

    fn decode(&self, payload: &[u8]) -> Result<FieldMap, SerializationError> {
        match serde_yaml::from_slice(payload) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(other) => Err(SerializationError::decode(
                &self.content_type,
                format!("expected a YAML mapping, found {}", kind(&other)),
            )),
            Err(e) => Err(SerializationError::decode(&self.content_type, e)),
        }
    }
}
