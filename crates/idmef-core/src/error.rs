//! # Error Types: IDMEFv2 Error Taxonomy
//!
//! Every failure a caller can observe maps onto one [`IdmefError`] variant.
//! All errors use `thiserror` for derive-based `Display` and `Error`.
//!
//! ## Design
//!
//! - Version and schema resolution errors are terminal and never retried.
//! - Validation errors carry the validator's structured diagnostics
//!   (instance path, schema path, message) and are never swallowed.
//! - Codec faults are reported through [`SerializationError`] and kept
//!   separate from validation failures.

use std::fmt;

use thiserror::Error;

/// Top-level error type for IDMEFv2 message handling.
#[derive(Error, Debug)]
pub enum IdmefError {
    /// The `Version` field is absent or does not match `<major>.D.V<minor>`.
    #[error("malformed version field: {}", .found.as_deref().unwrap_or("<absent>"))]
    MalformedVersion {
        /// The raw value found in the message, if any.
        found: Option<String>,
    },

    /// Neither the versioned nor the `latest` schema resource exists.
    #[error("no schema published for version {version} (looked in {namespace} and its latest fallback)")]
    SchemaNotFound {
        /// Version token that was requested.
        version: String,
        /// Versioned namespace that was probed first.
        namespace: String,
    },

    /// A schema resource exists but could not be read or parsed.
    #[error("failed to load schema {namespace}: {reason}")]
    SchemaLoad {
        /// Namespace the resource was read from.
        namespace: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// A schema document could not be compiled by the validator.
    #[error("failed to compile schema {namespace}: {reason}")]
    SchemaCompile {
        /// Namespace of the schema that failed to compile.
        namespace: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The message does not conform to its resolved schema.
    #[error("message failed validation against {schema}:\n{violations}")]
    Validation {
        /// Namespace of the schema the message was checked against.
        schema: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// No codec is registered for the requested content type.
    #[error("no codec registered for content type {0:?}")]
    UnknownCodec(String),

    /// A codec failed to encode or decode.
    #[error("serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

impl IdmefError {
    /// Shorthand for a `MalformedVersion` error carrying the offending value.
    pub fn malformed_version(found: impl Into<String>) -> Self {
        Self::MalformedVersion {
            found: Some(found.into()),
        }
    }
}

/// Codec-internal failure while producing or parsing bytes.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// The encoder could not produce bytes for the message.
    #[error("failed to encode message as {content_type}: {reason}")]
    Encode {
        /// Content type of the codec that failed.
        content_type: String,
        /// Underlying encoder diagnostic.
        reason: String,
    },

    /// The payload is malformed or corrupt.
    #[error("failed to decode {content_type} payload: {reason}")]
    Decode {
        /// Content type of the codec that failed.
        content_type: String,
        /// Underlying decoder diagnostic.
        reason: String,
    },
}

impl SerializationError {
    /// Build an [`SerializationError::Encode`] from any displayable cause.
    pub fn encode(content_type: &str, reason: impl fmt::Display) -> Self {
        Self::Encode {
            content_type: content_type.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build an [`SerializationError::Decode`] from any displayable cause.
    pub fn decode(content_type: &str, reason: impl fmt::Display) -> Self {
        Self::Decode {
            content_type: content_type.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the message.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Wrap a list of violations.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl FromIterator<Violation> for ValidationViolations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_version_display_names_the_value() {
        let err = IdmefError::malformed_version("2.D.3");
        assert_eq!(err.to_string(), "malformed version field: 2.D.3");
    }

    #[test]
    fn malformed_version_display_absent() {
        let err = IdmefError::MalformedVersion { found: None };
        assert!(err.to_string().contains("<absent>"));
    }

    #[test]
    fn serialization_error_converts_into_idmef_error() {
        let err: IdmefError = SerializationError::decode("application/json", "EOF").into();
        assert!(matches!(err, IdmefError::Serialization(_)));
        assert!(err.to_string().contains("application/json"));
    }

    #[test]
    fn violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""ID" is a required property"#.to_string(),
        };
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn violations_display_one_per_line() {
        let violations: ValidationViolations = vec![
            Violation {
                instance_path: "/Analyzer/IP".to_string(),
                schema_path: "/properties/Analyzer/properties/IP/type".to_string(),
                message: "42 is not of type \"string\"".to_string(),
            },
            Violation {
                instance_path: String::new(),
                schema_path: "/required".to_string(),
                message: "\"ID\" is a required property".to_string(),
            },
        ]
        .into_iter()
        .collect();
        let display = violations.to_string();
        assert_eq!(display.lines().count(), 2);
        assert!(display.contains("/Analyzer/IP"));
        assert_eq!(violations.len(), 2);
    }
}
