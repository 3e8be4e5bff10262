//! Registry configuration.
//!
//! A registry can be described as a YAML table of `(content type, codec)`
//! pairs, where `codec` names one of the compiled-in codec kinds:
//!
//! ```yaml
//! codecs:
//!   - content_type: application/json
//!     codec: json
//!   - content_type: application/idmefv2+json
//!     codec: json
//!   - content_type: application/yaml
//!     codec: yaml
//! ```
//!
//! An unknown kind is not a configuration error. It becomes a registration
//! whose factory fails, and discovery skips it with a warning like any other
//! broken codec.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{Codec, CodecLoadError, CodecRegistration};
use crate::json::{JsonCodec, JSON_CONTENT_TYPE};
use crate::yaml::{YamlCodec, YAML_CONTENT_TYPE};

/// Failure reading a registry configuration.
#[derive(Error, Debug)]
pub enum RegistryConfigError {
    /// The file could not be read.
    #[error("cannot read codec configuration {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not a valid configuration.
    #[error("invalid codec configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// One configured codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecEntry {
    /// Content type the codec is registered under.
    pub content_type: String,
    /// Compiled-in codec kind (`json` or `yaml`).
    pub codec: String,
}

/// Ordered list of codecs to register.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Codecs in registration order.
    #[serde(default)]
    pub codecs: Vec<CodecEntry>,
}

impl RegistryConfig {
    /// The default table: JSON and YAML under their IANA content types.
    pub fn builtin() -> Self {
        Self {
            codecs: vec![
                CodecEntry {
                    content_type: JSON_CONTENT_TYPE.to_string(),
                    codec: "json".to_string(),
                },
                CodecEntry {
                    content_type: YAML_CONTENT_TYPE.to_string(),
                    codec: "yaml".to_string(),
                },
            ],
        }
    }

    /// Parse a YAML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryConfigError::Parse`] if the document is malformed.
    pub fn from_yaml_str(s: &str) -> Result<Self, RegistryConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Read and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryConfigError::Io`] if the file cannot be read and
    /// [`RegistryConfigError::Parse`] if it is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RegistryConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Turn the table into registrations, in order.
    pub fn registrations(&self) -> Vec<CodecRegistration> {
        self.codecs.iter().map(CodecEntry::registration).collect()
    }
}

impl CodecEntry {
    /// Build the registration for this entry.
    pub fn registration(&self) -> CodecRegistration {
        let content_type = self.content_type.clone();
        let kind = self.codec.clone();
        CodecRegistration::new(self.content_type.clone(), self.codec.clone(), move || {
            builtin_codec(&kind, &content_type)
        })
    }
}

fn builtin_codec(kind: &str, content_type: &str) -> Result<Box<dyn Codec>, CodecLoadError> {
    match kind {
        "json" => Ok(Box::new(JsonCodec::with_content_type(content_type))),
        "yaml" => Ok(Box::new(YamlCodec::with_content_type(content_type))),
        other => Err(CodecLoadError::UnknownKind(other.to_string())),
    }
}
