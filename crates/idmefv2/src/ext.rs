//! Message operations as methods.

use idmef_core::{IdmefError, Message, SerializedPayload};

use crate::context::Idmef;

/// Validate and (de)serialize a [`Message`] through [`Idmef::global`].
///
/// Use an explicit [`Idmef`] context to run against other schemas or codecs.
///
/// `Message` also implements `serde::Serialize`, whose method is named
/// `serialize` too. With both traits in scope `msg.serialize(..)` is
/// ambiguous; call `MessageExt::serialize(&msg, content_type)` or
/// [`Idmef::serialize`] instead.
pub trait MessageExt: Sized {
    /// See [`Idmef::validate`].
    fn validate(&self) -> Result<(), IdmefError>;

    /// See [`Idmef::serialize`].
    fn serialize(&self, content_type: &str) -> Result<SerializedPayload, IdmefError>;

    /// See [`Idmef::unserialize`].
    fn unserialize(payload: &SerializedPayload) -> Result<Self, IdmefError>;
}

impl MessageExt for Message {
    fn validate(&self) -> Result<(), IdmefError> {
        Idmef::global().validate(self)
    }

    fn serialize(&self, content_type: &str) -> Result<SerializedPayload, IdmefError> {
        Idmef::global().serialize(self, content_type)
    }

    fn unserialize(payload: &SerializedPayload) -> Result<Self, IdmefError> {
        Idmef::global().unserialize(payload)
    }
}
