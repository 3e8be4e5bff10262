//! # Schema Store
//!
//! Maps a message's version token to the schema document it must conform to.
//!
//! ## Fallback Rule
//!
//! 1. `<base>.<token>/IDMEFv2.schema` if published.
//! 2. Otherwise `<base>.latest/IDMEFv2.schema` if published.
//! 3. Otherwise [`IdmefError::SchemaNotFound`].
//!
//! The fallback fires on absence only. A published resource that cannot be
//! read or parsed is an error, not a reason to try `latest`.
//!
//! ## Caching
//!
//! Resolved documents are cached per token for the lifetime of the store.
//! Loading happens under the cache lock, so each token is loaded at most
//! once even when the store is shared between threads.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use idmef_core::{IdmefError, Message, VersionToken};
use parking_lot::Mutex;
use serde_json::Value;

use crate::source::{namespace_for, EmbeddedSchemas, SchemaSource, SCHEMA_RESOURCE};

/// Which namespace a resolved schema came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOrigin {
    /// The namespace named by the requested token.
    Versioned,
    /// The `latest` fallback namespace.
    Latest,
}

/// A resolved, parsed schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    namespace: String,
    requested: VersionToken,
    origin: SchemaOrigin,
    schema: Value,
}

impl SchemaDocument {
    /// Namespace the schema was read from.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Token the caller asked for.
    pub fn requested(&self) -> &VersionToken {
        &self.requested
    }

    /// Whether the versioned schema or the `latest` fallback was used.
    pub fn origin(&self) -> SchemaOrigin {
        self.origin
    }

    /// The JSON Schema document.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The schema's `$id`, if declared.
    pub fn id(&self) -> Option<&str> {
        self.schema.get("$id").and_then(Value::as_str)
    }
}

/// Resolves version tokens to schema documents.
pub struct SchemaStore {
    source: Box<dyn SchemaSource>,
    cache: Mutex<HashMap<VersionToken, Arc<SchemaDocument>>>,
}

impl fmt::Debug for SchemaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaStore")
            .field("source", &self.source.describe())
            .field("cached", &self.cache.lock().len())
            .finish()
    }
}

impl Default for SchemaStore {
    fn default() -> Self {
        Self::embedded()
    }
}

impl SchemaStore {
    /// Create a store reading from `source`.
    pub fn new(source: impl SchemaSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store over the drafts compiled into this crate.
    pub fn embedded() -> Self {
        Self::new(EmbeddedSchemas)
    }

    /// Description of the underlying source.
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Extract the version token from a raw `Version` field.
    ///
    /// # Errors
    ///
    /// Returns [`IdmefError::MalformedVersion`] if `field` does not match
    /// `<digit>.D.V<digits>`.
    pub fn resolve_version(&self, field: &str) -> Result<VersionToken, IdmefError> {
        VersionToken::parse_field(field)
    }

    /// Resolve the schema for `token`, falling back to `latest`.
    ///
    /// # Errors
    ///
    /// - [`IdmefError::SchemaNotFound`] if neither namespace has a schema.
    /// - [`IdmefError::SchemaLoad`] if a published schema cannot be read or
    ///   is not valid JSON.
    pub fn resolve_schema(&self, token: &VersionToken) -> Result<Arc<SchemaDocument>, IdmefError> {
        let mut cache = self.cache.lock();
        if let Some(doc) = cache.get(token) {
            return Ok(Arc::clone(doc));
        }

        let doc = Arc::new(self.load(token)?);
        tracing::debug!(
            version = %token,
            namespace = doc.namespace(),
            origin = ?doc.origin(),
            "resolved IDMEFv2 schema"
        );
        cache.insert(token.clone(), Arc::clone(&doc));
        Ok(doc)
    }

    /// Resolve the schema for a message from its `Version` field.
    ///
    /// # Errors
    ///
    /// Returns [`IdmefError::MalformedVersion`] if the field is missing or
    /// ill-formed, and the errors of [`resolve_schema`](Self::resolve_schema)
    /// otherwise.
    pub fn schema_for(&self, message: &Message) -> Result<Arc<SchemaDocument>, IdmefError> {
        let token = message.version_token()?;
        self.resolve_schema(&token)
    }

    /// Tokens resolved so far, sorted.
    pub fn cached_tokens(&self) -> Vec<VersionToken> {
        let mut tokens: Vec<VersionToken> = self.cache.lock().keys().cloned().collect();
        tokens.sort();
        tokens
    }

    /// Forget every resolved schema.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    fn load(&self, token: &VersionToken) -> Result<SchemaDocument, IdmefError> {
        let versioned = namespace_for(token);
        if let Some(bytes) = self.fetch(&versioned)? {
            let origin = if token.is_latest() {
                SchemaOrigin::Latest
            } else {
                SchemaOrigin::Versioned
            };
            return Self::parse(versioned, token, origin, &bytes);
        }

        let latest = namespace_for(&VersionToken::latest());
        match self.fetch(&latest)? {
            Some(bytes) => {
                tracing::debug!(
                    version = %token,
                    "no versioned schema published, using latest"
                );
                Self::parse(latest, token, SchemaOrigin::Latest, &bytes)
            }
            None => Err(IdmefError::SchemaNotFound {
                version: token.to_string(),
                namespace: versioned,
            }),
        }
    }

    fn fetch(&self, namespace: &str) -> Result<Option<Vec<u8>>, IdmefError> {
        self.source
            .fetch(namespace, SCHEMA_RESOURCE)
            .map_err(|e| IdmefError::SchemaLoad {
                namespace: namespace.to_string(),
                reason: e.to_string(),
            })
    }

    fn parse(
        namespace: String,
        token: &VersionToken,
        origin: SchemaOrigin,
        bytes: &[u8],
    ) -> Result<SchemaDocument, IdmefError> {
        let schema: Value = serde_json::from_slice(bytes).map_err(|e| IdmefError::SchemaLoad {
            namespace: namespace.clone(),
            reason: format!("invalid JSON: {e}"),
        })?;
        Ok(SchemaDocument {
            namespace,
            requested: token.clone(),
            origin,
            schema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::source::{MemorySchemas, SourceError};

    fn token(digits: &str) -> VersionToken {
        VersionToken::from_digits(digits).unwrap()
    }

    fn store_with(versions: &[&str]) -> SchemaStore {
        let mut src = MemorySchemas::new();
        for v in versions {
            src.publish(v, &json!({"$id": format!("urn:test:{v}"), "type": "object"}));
        }
        SchemaStore::new(src)
    }

    #[test]
    fn versioned_schema_wins_over_latest() {
        let store = store_with(&["03", "latest"]);
        let doc = store.resolve_schema(&token("03")).unwrap();
        assert_eq!(doc.origin(), SchemaOrigin::Versioned);
        assert_eq!(doc.id(), Some("urn:test:03"));
        assert_eq!(doc.namespace(), "idmefv2.schemas.drafts.IDMEFv2.03");
    }

    #[test]
    fn falls_back_to_latest() {
        let store = store_with(&["03", "latest"]);
        let doc = store.resolve_schema(&token("07")).unwrap();
        assert_eq!(doc.origin(), SchemaOrigin::Latest);
        assert_eq!(doc.id(), Some("urn:test:latest"));
        assert_eq!(doc.requested().as_str(), "07");
    }

    #[test]
    fn neither_versioned_nor_latest_is_not_found() {
        let store = store_with(&["03"]);
        let err = store.resolve_schema(&token("07")).unwrap_err();
        match err {
            IdmefError::SchemaNotFound { version, namespace } => {
                assert_eq!(version, "07");
                assert_eq!(namespace, "idmefv2.schemas.drafts.IDMEFv2.07");
            }
            other => panic!("expected SchemaNotFound, got {other}"),
        }
    }

    #[test]
    fn unparsable_versioned_schema_does_not_fall_back() {
        let mut src = MemorySchemas::new();
        src.insert("idmefv2.schemas.drafts.IDMEFv2.03", SCHEMA_RESOURCE, b"{not json".to_vec());
        src.publish("latest", &json!({"type": "object"}));
        let store = SchemaStore::new(src);
        let err = store.resolve_schema(&token("03")).unwrap_err();
        assert!(matches!(err, IdmefError::SchemaLoad { .. }), "got {err}");
    }

    #[test]
    fn resolve_version_rejects_malformed() {
        let store = SchemaStore::embedded();
        for bad in ["abc", "2.D.3", ""] {
            assert!(matches!(
                store.resolve_version(bad),
                Err(IdmefError::MalformedVersion { .. })
            ));
        }
        assert_eq!(store.resolve_version("2.D.V03").unwrap().as_str(), "03");
    }

    #[test]
    fn embedded_store_resolves_draft_03_and_falls_back_for_others() {
        let store = SchemaStore::embedded();
        let v03 = store.resolve_schema(&token("03")).unwrap();
        assert_eq!(v03.origin(), SchemaOrigin::Versioned);
        let v42 = store.resolve_schema(&token("42")).unwrap();
        assert_eq!(v42.origin(), SchemaOrigin::Latest);
        assert_eq!(v42.namespace(), "idmefv2.schemas.drafts.IDMEFv2.latest");
    }

    #[test]
    fn schema_for_message_requires_version() {
        let store = SchemaStore::embedded();
        let msg = Message::new();
        assert!(matches!(
            store.schema_for(&msg),
            Err(IdmefError::MalformedVersion { found: None })
        ));
    }

    struct CountingSource {
        inner: MemorySchemas,
        fetches: Arc<AtomicUsize>,
    }

    impl SchemaSource for CountingSource {
        fn fetch(&self, namespace: &str, resource: &str) -> Result<Option<Vec<u8>>, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(namespace, resource)
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn counting_store(versions: &[&str]) -> (SchemaStore, Arc<AtomicUsize>) {
        let mut inner = MemorySchemas::new();
        for v in versions {
            inner.publish(v, &json!({"type": "object"}));
        }
        let fetches = Arc::new(AtomicUsize::new(0));
        let store = SchemaStore::new(CountingSource {
            inner,
            fetches: Arc::clone(&fetches),
        });
        (store, fetches)
    }

    #[test]
    fn concurrent_resolution_loads_once() {
        let (store, fetches) = counting_store(&["03"]);
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.resolve_schema(&token("03")).unwrap())
            })
            .collect();
        let docs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for doc in &docs[1..] {
            assert_eq!(**doc, *docs[0]);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(store.cached_tokens(), vec![token("03")]);
    }

    #[test]
    fn fallback_costs_two_fetches_then_none() {
        let (store, fetches) = counting_store(&["latest"]);
        for _ in 0..5 {
            let doc = store.resolve_schema(&token("09")).unwrap();
            assert_eq!(doc.origin(), SchemaOrigin::Latest);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn clear_cache_forces_reload() {
        let (store, fetches) = counting_store(&["03"]);
        store.resolve_schema(&token("03")).unwrap();
        store.clear_cache();
        assert!(store.cached_tokens().is_empty());
        store.resolve_schema(&token("03")).unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_resolution_is_not_cached() {
        let (store, fetches) = counting_store(&[]);
        assert!(store.resolve_schema(&token("03")).is_err());
        assert!(store.resolve_schema(&token("03")).is_err());
        assert_eq!(fetches.load(Ordering::SeqCst), 4);
        assert!(store.cached_tokens().is_empty());
    }
}
