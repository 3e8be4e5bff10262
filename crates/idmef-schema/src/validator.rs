//! # Document Validation
//!
//! The JSON-Schema algorithm is an external collaborator. This module defines
//! the boundary ([`DocumentValidator`]) and one implementation backed by the
//! `jsonschema` crate (Draft 2020-12).
//!
//! Compiled validators are cached per schema namespace together with the
//! schema they were compiled from. The same namespace can name different
//! documents in different stores (or after a directory schema is edited), so
//! a cached entry is reused only when its schema equals the one being
//! validated against; otherwise it is recompiled and replaced.
//!
//! Remote `$ref` targets are never fetched: the local retriever refuses every
//! URI, so a schema can only reference its own `$defs`.

use std::collections::HashMap;
use std::sync::Arc;

use idmef_core::{IdmefError, ValidationViolations, Violation};
use jsonschema::Validator;
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

use crate::store::SchemaDocument;

/// Failure reported by a [`DocumentValidator`].
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// The document does not conform to the schema.
    #[error("document does not conform:\n{0}")]
    Nonconforming(ValidationViolations),

    /// The schema itself could not be compiled.
    #[error("schema cannot be compiled: {0}")]
    Compile(String),
}

impl ValidatorError {
    /// Attach the schema identity and lift into the caller-facing taxonomy.
    pub fn into_idmef(self, schema: &SchemaDocument) -> IdmefError {
        match self {
            Self::Nonconforming(violations) => IdmefError::Validation {
                schema: schema.namespace().to_string(),
                violations,
            },
            Self::Compile(reason) => IdmefError::SchemaCompile {
                namespace: schema.namespace().to_string(),
                reason,
            },
        }
    }
}

/// Black-box JSON-Schema validation primitive.
pub trait DocumentValidator: Send + Sync {
    /// Check `document` against `schema`.
    fn validate(&self, document: &Value, schema: &SchemaDocument) -> Result<(), ValidatorError>;
}

/// Retriever that refuses every external `$ref`.
struct LocalOnlyRetriever;

impl jsonschema::Retrieve for LocalOnlyRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema reference not permitted: {}", uri.as_str()).into())
    }
}

struct CompiledSchema {
    schema: Value,
    validator: Arc<Validator>,
}

impl CompiledSchema {
    fn matching(&self, schema: &SchemaDocument) -> Option<Arc<Validator>> {
        (self.schema == *schema.schema()).then(|| Arc::clone(&self.validator))
    }
}

/// [`DocumentValidator`] backed by the `jsonschema` crate.
#[derive(Default)]
pub struct JsonSchemaValidator {
    compiled: RwLock<HashMap<String, CompiledSchema>>,
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("compiled", &self.compiled.read().len())
            .finish()
    }
}

impl JsonSchemaValidator {
    /// Create a validator with an empty compilation cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of compiled schemas held in the cache.
    pub fn compiled_count(&self) -> usize {
        self.compiled.read().len()
    }

    /// Drop all compiled schemas.
    pub fn clear(&self) {
        self.compiled.write().clear();
    }

    fn compiled(&self, schema: &SchemaDocument) -> Result<Arc<Validator>, ValidatorError> {
        if let Some(v) = self
            .compiled
            .read()
            .get(schema.namespace())
            .and_then(|c| c.matching(schema))
        {
            return Ok(v);
        }

        let mut cache = self.compiled.write();
        if let Some(v) = cache
            .get(schema.namespace())
            .and_then(|c| c.matching(schema))
        {
            return Ok(v);
        }
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .with_retriever(LocalOnlyRetriever)
            .build(schema.schema())
            .map_err(|e| ValidatorError::Compile(e.to_string()))?;
        let validator = Arc::new(validator);
        cache.insert(
            schema.namespace().to_string(),
            CompiledSchema {
                schema: schema.schema().clone(),
                validator: Arc::clone(&validator),
            },
        );
        tracing::debug!(namespace = schema.namespace(), "compiled IDMEFv2 schema");
        Ok(validator)
    }
}

impl DocumentValidator for JsonSchemaValidator {
    fn validate(&self, document: &Value, schema: &SchemaDocument) -> Result<(), ValidatorError> {
        let validator = self.compiled(schema)?;

        let violations: ValidationViolations = validator
            .iter_errors(document)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidatorError::Nonconforming(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idmef_core::VersionToken;
    use serde_json::json;

    use crate::source::MemorySchemas;
    use crate::store::SchemaStore;

    fn resolve(schema: Value) -> Arc<SchemaDocument> {
        let mut src = MemorySchemas::new();
        src.publish("latest", &schema);
        SchemaStore::new(src)
            .resolve_schema(&VersionToken::latest())
            .unwrap()
    }

    #[test]
    fn accepts_conforming_document() {
        let doc = resolve(json!({
            "type": "object",
            "required": ["ID"],
            "properties": {"ID": {"type": "string"}}
        }));
        let v = JsonSchemaValidator::new();
        v.validate(&json!({"ID": "x"}), &doc).unwrap();
    }

    #[test]
    fn reports_every_violation_with_paths() {
        let doc = resolve(json!({
            "type": "object",
            "required": ["ID", "Analyzer"],
            "properties": {
                "Analyzer": {
                    "type": "object",
                    "properties": {"IP": {"type": "string"}}
                }
            }
        }));
        let v = JsonSchemaValidator::new();
        let err = v
            .validate(&json!({"Analyzer": {"IP": 42}}), &doc)
            .unwrap_err();
        match err {
            ValidatorError::Nonconforming(violations) => {
                assert_eq!(violations.len(), 2);
                let paths: Vec<&str> = violations
                    .violations()
                    .iter()
                    .map(|v| v.instance_path.as_str())
                    .collect();
                assert!(paths.contains(&"/Analyzer/IP"), "{paths:?}");
                assert!(violations.to_string().contains("ID"));
            }
            other => panic!("expected Nonconforming, got {other}"),
        }
    }

    #[test]
    fn compiles_once_per_namespace() {
        let doc = resolve(json!({"type": "object"}));
        let v = JsonSchemaValidator::new();
        for _ in 0..3 {
            v.validate(&json!({}), &doc).unwrap();
        }
        assert_eq!(v.compiled_count(), 1);
        v.clear();
        assert_eq!(v.compiled_count(), 0);
    }

    #[test]
    fn same_namespace_different_schema_is_recompiled() {
        let strict = resolve(json!({"type": "object", "required": ["Strict"]}));
        let lax = resolve(json!({"type": "object"}));
        assert_eq!(strict.namespace(), lax.namespace());

        let v = JsonSchemaValidator::new();
        assert!(v.validate(&json!({}), &strict).is_err());
        v.validate(&json!({}), &lax).unwrap();
        assert!(v.validate(&json!({}), &strict).is_err());
        assert_eq!(v.compiled_count(), 1);
    }

    #[test]
    fn invalid_schema_is_a_compile_error() {
        let doc = resolve(json!({"type": 12}));
        let v = JsonSchemaValidator::new();
        let err = v.validate(&json!({}), &doc).unwrap_err();
        assert!(matches!(err, ValidatorError::Compile(_)), "got {err}");
        let lifted = err.into_idmef(&doc);
        assert!(matches!(lifted, IdmefError::SchemaCompile { .. }));
    }

    #[test]
    fn external_refs_are_not_fetched() {
        let doc = resolve(json!({"$ref": "https://example.invalid/remote.schema"}));
        let v = JsonSchemaValidator::new();
        assert!(matches!(
            v.validate(&json!({}), &doc),
            Err(ValidatorError::Compile(_))
        ));
    }

    #[test]
    fn nonconforming_lifts_to_validation_error() {
        let doc = resolve(json!({"type": "object", "required": ["ID"]}));
        let err = JsonSchemaValidator::new()
            .validate(&json!({}), &doc)
            .unwrap_err()
            .into_idmef(&doc);
        match err {
            IdmefError::Validation { schema, violations } => {
                assert_eq!(schema, "idmefv2.schemas.drafts.IDMEFv2.latest");
                assert_eq!(violations.len(), 1);
            }
            other => panic!("expected Validation, got {other}"),
        }
    }
}
