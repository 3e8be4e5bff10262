//! # Message Operations
//!
//! [`Idmef`] owns the collaborators a message needs:
//!
//! - a [`SchemaStore`] to turn `Version` into a schema document,
//! - a [`DocumentValidator`] to check the message against it,
//! - a [`CodecRegistry`] to find the codec for a content type.
//!
//! ## Invariants
//!
//! - `serialize` never encodes a message that has not just passed
//!   validation. The codec lookup happens first, so an unknown content type
//!   is reported before any validation work.
//! - `unserialize` never returns a message that has not passed validation.
//!   A payload that decodes but does not conform is rejected.
//! - Validation has no side effects on the message.

use std::fmt;
use std::sync::{Arc, OnceLock};

use idmef_codec::CodecRegistry;
use idmef_core::{IdmefError, Message, SerializedPayload};
use idmef_schema::{
    DirectorySchemas, DocumentValidator, JsonSchemaValidator, SchemaSource, SchemaStore,
};

use crate::config::IdmefConfig;

/// Validation and serialization context for IDMEFv2 messages.
#[derive(Clone)]
pub struct Idmef {
    schemas: Arc<SchemaStore>,
    validator: Arc<dyn DocumentValidator>,
    codecs: Arc<CodecRegistry>,
}

impl fmt::Debug for Idmef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Idmef")
            .field("schemas", &self.schemas)
            .field("codecs", &self.codecs)
            .finish_non_exhaustive()
    }
}

impl Default for Idmef {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Idmef {
    /// Start wiring a context explicitly.
    pub fn builder() -> IdmefBuilder {
        IdmefBuilder::default()
    }

    /// Assemble a context from configuration.
    pub fn from_config(config: &IdmefConfig) -> Self {
        let builder = Self::builder().codecs(CodecRegistry::from_config(&config.codecs));
        match &config.schema_dir {
            Some(dir) => builder.schema_source(DirectorySchemas::new(dir)).build(),
            None => builder.build(),
        }
    }

    /// The process-wide context, assembled from the environment on first use.
    ///
    /// If the environment configuration cannot be read, the embedded drafts
    /// and built-in codecs are used and a warning is logged.
    pub fn global() -> &'static Idmef {
        static GLOBAL: OnceLock<Idmef> = OnceLock::new();
        GLOBAL.get_or_init(|| match IdmefConfig::from_env() {
            Ok(config) => Self::from_config(&config),
            Err(e) => {
                tracing::warn!(error = %e, "invalid IDMEFv2 configuration, using defaults");
                Self::default()
            }
        })
    }

    /// The schema store.
    pub fn schemas(&self) -> &SchemaStore {
        &self.schemas
    }

    /// The codec registry.
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// Check `message` against the schema resolved from its `Version`.
    ///
    /// # Errors
    ///
    /// - [`IdmefError::MalformedVersion`] if `Version` is absent or ill-formed.
    /// - [`IdmefError::SchemaNotFound`] / [`IdmefError::SchemaLoad`] from
    ///   schema resolution.
    /// - [`IdmefError::Validation`] with the validator's diagnostics if the
    ///   message does not conform.
    pub fn validate(&self, message: &Message) -> Result<(), IdmefError> {
        let schema = self.schemas.schema_for(message)?;
        self.validator
            .validate(&message.to_value(), &schema)
            .map_err(|e| e.into_idmef(&schema))?;
        tracing::debug!(schema = schema.namespace(), "message validated");
        Ok(())
    }

    /// Validate `message` and encode it as `content_type`.
    ///
    /// # Errors
    ///
    /// - [`IdmefError::UnknownCodec`] if nothing serves `content_type`.
    /// - Any error of [`validate`](Self::validate); the codec is not invoked.
    /// - [`IdmefError::Serialization`] if the codec fails.
    pub fn serialize(
        &self,
        message: &Message,
        content_type: &str,
    ) -> Result<SerializedPayload, IdmefError> {
        let codec = self.codecs.lookup(content_type)?;
        self.validate(message)?;
        let bytes = codec.encode(message)?;
        tracing::debug!(content_type, bytes = bytes.len(), "message serialized");
        Ok(SerializedPayload::new(content_type, bytes))
    }

    /// Decode `payload` into a new message and validate it.
    ///
    /// # Errors
    ///
    /// - [`IdmefError::UnknownCodec`] if nothing serves the payload's type.
    /// - [`IdmefError::Serialization`] if the bytes cannot be decoded.
    /// - Any error of [`validate`](Self::validate) for the decoded message.
    pub fn unserialize(&self, payload: &SerializedPayload) -> Result<Message, IdmefError> {
        let codec = self.codecs.lookup(payload.content_type())?;
        let fields = codec.decode(payload.payload())?;
        let message = Message::from_fields(fields);
        self.validate(&message)?;
        tracing::debug!(
            content_type = payload.content_type(),
            bytes = payload.len(),
            "message unserialized"
        );
        Ok(message)
    }
}

/// Explicit wiring for an [`Idmef`] context.
///
/// Unset collaborators default to the embedded drafts, the `jsonschema`
/// validator and the built-in codecs.
#[derive(Default)]
pub struct IdmefBuilder {
    schemas: Option<Arc<SchemaStore>>,
    validator: Option<Arc<dyn DocumentValidator>>,
    codecs: Option<Arc<CodecRegistry>>,
}

impl fmt::Debug for IdmefBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdmefBuilder")
            .field("schemas", &self.schemas)
            .field("validator", &self.validator.is_some())
            .field("codecs", &self.codecs)
            .finish()
    }
}

impl IdmefBuilder {
    /// Read schemas from `source`.
    pub fn schema_source(self, source: impl SchemaSource + 'static) -> Self {
        self.schema_store(SchemaStore::new(source))
    }

    /// Use an existing schema store.
    pub fn schema_store(mut self, store: impl Into<Arc<SchemaStore>>) -> Self {
        self.schemas = Some(store.into());
        self
    }

    /// Use another validation primitive.
    pub fn validator(mut self, validator: Arc<dyn DocumentValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Use a specific codec registry.
    pub fn codecs(mut self, registry: impl Into<Arc<CodecRegistry>>) -> Self {
        self.codecs = Some(registry.into());
        self
    }

    /// Finish wiring.
    pub fn build(self) -> Idmef {
        Idmef {
            schemas: self
                .schemas
                .unwrap_or_else(|| Arc::new(SchemaStore::embedded())),
            validator: self
                .validator
                .unwrap_or_else(|| Arc::new(JsonSchemaValidator::new())),
            codecs: self
                .codecs
                .unwrap_or_else(|| Arc::new(CodecRegistry::builtin())),
        }
    }
}
