//! Environment configuration.
//!
//! Variables:
//! - `IDMEF_SCHEMA_DIR`: read schemas from this directory, laid out as
//!   `<dir>/<token>/IDMEFv2.schema` (default: the embedded drafts).
//! - `IDMEF_CODECS_FILE`: YAML codec table (default: JSON and YAML under
//!   their IANA content types).

use std::path::PathBuf;

use idmef_codec::{RegistryConfig, RegistryConfigError};
use thiserror::Error;

/// Variable naming the schema directory.
pub const SCHEMA_DIR_VAR: &str = "IDMEF_SCHEMA_DIR";

/// Variable naming the codec table file.
pub const CODECS_FILE_VAR: &str = "IDMEF_CODECS_FILE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{SCHEMA_DIR_VAR} does not name a directory: {0}")]
    SchemaDir(String),
    #[error(transparent)]
    Codecs(#[from] RegistryConfigError),
}

/// How to assemble an [`Idmef`](crate::Idmef) context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdmefConfig {
    /// Schema directory; `None` selects the embedded drafts.
    pub schema_dir: Option<PathBuf>,
    /// Codec table.
    pub codecs: RegistryConfig,
}

impl Default for IdmefConfig {
    fn default() -> Self {
        Self {
            schema_dir: None,
            codecs: RegistryConfig::builtin(),
        }
    }
}

impl IdmefConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let schema_dir = match lookup(SCHEMA_DIR_VAR).filter(|s| !s.is_empty()) {
            Some(dir) => {
                let path = PathBuf::from(dir);
                if !path.is_dir() {
                    return Err(ConfigError::SchemaDir(path.display().to_string()));
                }
                Some(path)
            }
            None => None,
        };

        let codecs = match lookup(CODECS_FILE_VAR).filter(|s| !s.is_empty()) {
            Some(file) => RegistryConfig::from_file(file)?,
            None => RegistryConfig::builtin(),
        };

        Ok(Self { schema_dir, codecs })
    }
}
