//! # Codec Registry
//!
//! Maps content types to live codec instances.
//!
//! ## Discovery
//!
//! Discovery runs the factory of every registration and keeps the codecs
//! that load. It happens on the first lookup, not at construction, and its
//! result is cached until [`CodecRegistry::reset`]. A registration is skipped
//! with a warning when its factory:
//!
//! - returns an error,
//! - panics,
//! - produces a codec whose `content_type()` differs from the registered one,
//! - targets a content type that an earlier registration already serves.
//!
//! ## Thread Safety
//!
//! Discovery runs under the table's write lock. Concurrent first callers
//! block until it finishes, so discovery runs at most once and nobody sees a
//! partially populated table. Lookups after that take the read lock only.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use idmef_core::IdmefError;
use parking_lot::RwLock;

use crate::codec::{Codec, CodecRegistration};
use crate::config::RegistryConfig;

type CodecTable = HashMap<String, Arc<dyn Codec>>;

/// Content-type keyed codec registry.
pub struct CodecRegistry {
    registrations: RwLock<Vec<CodecRegistration>>,
    table: RwLock<Option<Arc<CodecTable>>>,
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("registrations", &self.registrations.read().len())
            .field("discovered", &self.is_discovered())
            .finish()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CodecRegistry {
    /// Create a registry over an explicit registration list.
    pub fn new(registrations: Vec<CodecRegistration>) -> Self {
        Self {
            registrations: RwLock::new(registrations),
            table: RwLock::new(None),
        }
    }

    /// Registry with the built-in JSON and YAML codecs.
    pub fn builtin() -> Self {
        Self::from_config(&RegistryConfig::builtin())
    }

    /// Registry built from a configuration table.
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.registrations())
    }

    /// Run discovery now if it has not run yet.
    pub fn discover(&self) {
        self.table();
    }

    /// True once discovery has run (and not been reset since).
    pub fn is_discovered(&self) -> bool {
        self.table.read().is_some()
    }

    /// Return the codec registered for `content_type`.
    ///
    /// Matching is exact and case-sensitive; MIME parameters are not
    /// interpreted.
    ///
    /// # Errors
    ///
    /// Returns [`IdmefError::UnknownCodec`] when no loaded codec matches.
    pub fn lookup(&self, content_type: &str) -> Result<Arc<dyn Codec>, IdmefError> {
        self.table()
            .get(content_type)
            .cloned()
            .ok_or_else(|| IdmefError::UnknownCodec(content_type.to_string()))
    }

    /// Content types with a loaded codec, sorted.
    pub fn content_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.table().keys().cloned().collect();
        types.sort();
        types
    }

    /// Add a registration. If discovery already ran, the codec is loaded
    /// immediately under the same skip-and-warn rules.
    pub fn register(&self, registration: CodecRegistration) {
        let mut table = self.table.write();
        let mut registrations = self.registrations.write();
        if let Some(current) = table.as_ref() {
            let mut next = CodecTable::clone(current);
            Self::load_into(&mut next, &registration);
            *table = Some(Arc::new(next));
        }
        registrations.push(registration);
    }

    /// Drop the discovered codecs; the next lookup discovers again.
    pub fn reset(&self) {
        *self.table.write() = None;
    }

    /// Replace every registration and reset.
    pub fn reconfigure(&self, registrations: Vec<CodecRegistration>) {
        let mut table = self.table.write();
        *self.registrations.write() = registrations;
        *table = None;
    }

    fn table(&self) -> Arc<CodecTable> {
        if let Some(table) = self.table.read().as_ref() {
            return Arc::clone(table);
        }

        let mut slot = self.table.write();
        if let Some(table) = slot.as_ref() {
            return Arc::clone(table);
        }

        let registrations = self.registrations.read();
        let mut table = CodecTable::with_capacity(registrations.len());
        for registration in registrations.iter() {
            Self::load_into(&mut table, registration);
        }
        tracing::info!(
            registered = registrations.len(),
            loaded = table.len(),
            "codec discovery complete"
        );

        let table = Arc::new(table);
        *slot = Some(Arc::clone(&table));
        table
    }

    fn load_into(table: &mut CodecTable, registration: &CodecRegistration) {
        let content_type = registration.content_type();
        if table.contains_key(content_type) {
            tracing::warn!(
                content_type,
                codec = registration.name(),
                "content type already served, skipping codec"
            );
            return;
        }
        match Self::load(registration) {
            Ok(codec) => {
                tracing::debug!(content_type, codec = registration.name(), "codec loaded");
                table.insert(content_type.to_string(), codec);
            }
            Err(reason) => {
                tracing::warn!(
                    content_type,
                    codec = registration.name(),
                    %reason,
                    "skipping codec that failed to load"
                );
            }
        }
    }

    fn load(registration: &CodecRegistration) -> Result<Arc<dyn Codec>, String> {
        let codec = catch_unwind(AssertUnwindSafe(|| registration.instantiate()))
            .map_err(|payload| format!("factory panicked: {}", panic_message(&*payload)))?
            .map_err(|e| e.to_string())?;

        if codec.content_type() != registration.content_type() {
            return Err(format!(
                "codec serves {:?}, registered as {:?}",
                codec.content_type(),
                registration.content_type()
            ));
        }
        Ok(Arc::from(codec))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
