//! # Schema Sources
//!
//! A schema resource is addressed by a namespace and a resource name. The
//! namespace for a version token is `<base>.<token>`; the resource name is
//! always [`SCHEMA_RESOURCE`]. A source answers "what bytes are published at
//! this address", and `Ok(None)` is the only way to say "nothing is".
//!
//! Absence and failure are different things: a missing file drives the
//! `latest` fallback, an unreadable one is an error.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use idmef_core::VersionToken;
use serde_json::Value;
use thiserror::Error;

/// Base namespace under which every draft schema is published.
pub const SCHEMA_BASE_NAMESPACE: &str = "idmefv2.schemas.drafts.IDMEFv2";

/// Fixed name of the schema resource inside a version namespace.
pub const SCHEMA_RESOURCE: &str = "IDMEFv2.schema";

/// Namespace for a version token: `<base>.<token>`.
pub fn namespace_for(token: &VersionToken) -> String {
    format!("{SCHEMA_BASE_NAMESPACE}.{token}")
}

/// A schema resource exists (or may exist) but could not be read.
#[derive(Error, Debug)]
#[error("{location}: {reason}")]
pub struct SourceError {
    /// Where the source looked.
    pub location: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Provider of published schema resources.
pub trait SchemaSource: Send + Sync {
    /// Return the bytes published at `namespace`/`resource`, or `None` when
    /// nothing is published there.
    fn fetch(&self, namespace: &str, resource: &str) -> Result<Option<Vec<u8>>, SourceError>;

    /// Short description for diagnostics.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// Embedded drafts
// ---------------------------------------------------------------------------

const EMBEDDED_DRAFTS: &[(&str, &str)] = &[
    (
        "idmefv2.schemas.drafts.IDMEFv2.03",
        include_str!("../schemas/drafts/IDMEFv2/03/IDMEFv2.schema"),
    ),
    (
        "idmefv2.schemas.drafts.IDMEFv2.latest",
        include_str!("../schemas/drafts/IDMEFv2/latest/IDMEFv2.schema"),
    ),
];

/// The drafts compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSchemas;

impl EmbeddedSchemas {
    /// Namespaces that have an embedded schema.
    pub fn namespaces(&self) -> impl Iterator<Item = &'static str> {
        EMBEDDED_DRAFTS.iter().map(|(ns, _)| *ns)
    }
}

impl SchemaSource for EmbeddedSchemas {
    fn fetch(&self, namespace: &str, resource: &str) -> Result<Option<Vec<u8>>, SourceError> {
        if resource != SCHEMA_RESOURCE {
            return Ok(None);
        }
        Ok(EMBEDDED_DRAFTS
            .iter()
            .find(|(ns, _)| *ns == namespace)
            .map(|(_, body)| body.as_bytes().to_vec()))
    }

    fn describe(&self) -> String {
        "embedded drafts".to_string()
    }
}

// ---------------------------------------------------------------------------
// Directory tree
// ---------------------------------------------------------------------------

/// Schemas laid out on disk as `<root>/<token>/IDMEFv2.schema`.
///
/// Only namespaces directly under [`SCHEMA_BASE_NAMESPACE`] map to paths;
/// anything else, including tokens that would escape `root`, is absent.
#[derive(Debug, Clone)]
pub struct DirectorySchemas {
    root: PathBuf,
}

impl DirectorySchemas {
    /// Serve schemas from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory schemas are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resource_path(&self, namespace: &str, resource: &str) -> Option<PathBuf> {
        let token = namespace
            .strip_prefix(SCHEMA_BASE_NAMESPACE)?
            .strip_prefix('.')?;
        let is_segment = |s: &str| {
            !s.is_empty()
                && s.bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        };
        if !is_segment(token) || resource.contains(['/', '\\']) || resource.starts_with('.') {
            return None;
        }
        Some(self.root.join(token).join(resource))
    }
}

impl SchemaSource for DirectorySchemas {
    fn fetch(&self, namespace: &str, resource: &str) -> Result<Option<Vec<u8>>, SourceError> {
        let Some(path) = self.resource_path(namespace, resource) else {
            return Ok(None);
        };
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SourceError {
                location: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

// ---------------------------------------------------------------------------
// In-memory table
// ---------------------------------------------------------------------------

/// Schemas registered at runtime.
#[derive(Debug, Clone, Default)]
pub struct MemorySchemas {
    resources: HashMap<(String, String), Vec<u8>>,
}

impl MemorySchemas {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish raw bytes at `namespace`/`resource`.
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        resource: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.resources
            .insert((namespace.into(), resource.into()), bytes.into());
        self
    }

    /// Publish a schema document for a version token (use `"latest"` for the
    /// fallback namespace).
    pub fn publish(&mut self, token: &str, schema: &Value) -> &mut Self {
        self.insert(
            format!("{SCHEMA_BASE_NAMESPACE}.{token}"),
            SCHEMA_RESOURCE,
            schema.to_string().into_bytes(),
        )
    }
}

impl SchemaSource for MemorySchemas {
    fn fetch(&self, namespace: &str, resource: &str) -> Result<Option<Vec<u8>>, SourceError> {
        Ok(self
            .resources
            .get(&(namespace.to_string(), resource.to_string()))
            .cloned())
    }

    fn describe(&self) -> String {
        format!("in-memory table ({} resources)", self.resources.len())
    }
}
