//! # idmef-schema: Schema Resolution & Validation
//!
//! Resolves the JSON Schema a message must conform to and validates
//! documents against it.
//!
//! ## Resolution (`store`)
//!
//! A message's `Version` field (e.g. `2.D.V03`) yields a version token
//! (`03`). The schema lives in namespace `idmefv2.schemas.drafts.IDMEFv2.03`
//! under the fixed resource name `IDMEFv2.schema`. When that namespace has no
//! schema, [`SchemaStore`] falls back to `idmefv2.schemas.drafts.IDMEFv2.latest`.
//! If neither exists the lookup fails; there is no further guessing.
//!
//! ## Sources (`source`)
//!
//! Where the bytes come from is abstracted behind [`SchemaSource`]:
//! compiled-in drafts ([`EmbeddedSchemas`]), a directory tree following the
//! namespace convention ([`DirectorySchemas`]), or an in-memory table
//! ([`MemorySchemas`]).
//!
//! ## Validation (`validator`)
//!
//! The validation algorithm is a black box behind [`DocumentValidator`].
//! [`JsonSchemaValidator`] implements it with the `jsonschema` crate.
//!
//! ## Crate Policy
//!
//! - Depends only on `idmef-core` internally.
//! - Published schema namespaces are immutable; supporting a new draft means
//!   publishing a new namespace.

pub mod source;
pub mod store;
pub mod validator;

pub use source::{
    namespace_for, DirectorySchemas, EmbeddedSchemas, MemorySchemas, SchemaSource, SourceError,
    SCHEMA_BASE_NAMESPACE, SCHEMA_RESOURCE,
};
pub use store::{SchemaDocument, SchemaOrigin, SchemaStore};
pub use validator::{DocumentValidator, JsonSchemaValidator, ValidatorError};
