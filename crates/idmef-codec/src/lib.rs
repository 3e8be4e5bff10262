//! # idmef-codec: Codec Registry
//!
//! Converts messages to and from wire payloads, keyed by MIME content type.
//! The message model never names a concrete codec; it asks the
//! [`CodecRegistry`] for whatever is registered under a content type.
//!
//! ## Extension Point
//!
//! A codec is contributed as a [`CodecRegistration`]: a content type plus a
//! factory producing a [`Codec`]. Registrations come from an explicit list,
//! from the built-in set, or from a YAML [`RegistryConfig`]. Factories run
//! lazily on the first lookup; a factory that fails is skipped with a
//! warning so that one broken codec cannot hide the others.
//!
//! ## Built-in Codecs
//!
//! - [`JsonCodec`]: `application/json`
//! - [`YamlCodec`]: `application/yaml`

pub mod codec;
pub mod config;
pub mod json;
pub mod registry;
pub mod yaml;

pub use codec::{Codec, CodecFactory, CodecLoadError, CodecRegistration};
pub use config::{CodecEntry, RegistryConfig, RegistryConfigError};
pub use json::JsonCodec;
pub use registry::CodecRegistry;
pub use yaml::YamlCodec;
