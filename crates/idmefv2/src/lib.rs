//! # idmefv2: IDMEFv2 Message Handling
//!
//! Builds, validates and (de)serializes IDMEFv2 security event messages.
//!
//! ```no_run
//! use idmefv2::prelude::*;
//!
//! # fn main() -> Result<(), IdmefError> {
//! let mut msg = Message::new();
//! msg.insert("Version", "2.D.V03");
//! msg.insert("ID", "09db946e-673e-49af-b4b2-a8cd9da58de6");
//! msg.insert("CreateTime", "2021-11-22T14:42:51Z");
//! msg.insert("Analyzer", serde_json::json!({
//!     "IP": "127.0.0.1",
//!     "Name": "foobar",
//!     "Model": "generic",
//!     "Category": ["LOG"],
//!     "Data": ["Log"],
//!     "Method": ["Monitor"],
//! }));
//!
//! msg.validate()?;
//! let payload = msg.serialize("application/json")?;
//! let back = Message::unserialize(&payload)?;
//! assert_eq!(back, msg);
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! - [`Idmef`] wires a [`SchemaStore`], a [`DocumentValidator`] and a
//!   [`CodecRegistry`] together and implements validate / serialize /
//!   unserialize.
//! - [`MessageExt`] exposes the same operations as methods on [`Message`],
//!   backed by the process-wide [`Idmef::global`] context.
//! - [`IdmefConfig`] reads the schema directory and codec table from the
//!   environment.

pub mod config;
pub mod context;
pub mod ext;

pub use config::{ConfigError, IdmefConfig};
pub use context::{Idmef, IdmefBuilder};
pub use ext::MessageExt;

pub use idmef_codec::{
    Codec, CodecEntry, CodecLoadError, CodecRegistration, CodecRegistry, JsonCodec, RegistryConfig,
    YamlCodec,
};
pub use idmef_core::{
    FieldMap, IdmefError, Message, SerializationError, SerializedPayload, ValidationViolations,
    VersionToken, Violation,
};
pub use idmef_schema::{
    DirectorySchemas, DocumentValidator, EmbeddedSchemas, JsonSchemaValidator, MemorySchemas,
    SchemaDocument, SchemaOrigin, SchemaSource, SchemaStore, ValidatorError,
};

/// Everything needed to build and exchange messages.
///
/// With this prelude and `serde::Serialize` both in scope, `msg.serialize(..)`
/// is ambiguous because both traits provide it on [`Message`]. Call
/// `MessageExt::serialize(&msg, ct)` or [`Idmef::serialize`] there.
pub mod prelude {
    pub use crate::ext::MessageExt;
    pub use idmef_core::{IdmefError, Message, SerializedPayload};
}
