//! Serialized message container.

/// A serialized IDMEFv2 message: the wire bytes together with the MIME
/// content type that produced them.
///
/// Content types should be registered with IANA. A private type may be used
/// when the next processing entity is known to support it, and must then
/// follow the IANA naming conventions.
///
/// The pair is immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerializedPayload {
    content_type: String,
    payload: Vec<u8>,
}

impl SerializedPayload {
    /// Pair a content type with its encoded bytes.
    pub fn new(content_type: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            payload: payload.into(),
        }
    }

    /// The MIME content type of the payload.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The encoded bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Alias for [`payload`](Self::payload).
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Number of encoded bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True if the payload carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Split into `(content_type, bytes)`.
    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.content_type, self.payload)
    }
}

impl AsRef<[u8]> for SerializedPayload {
    fn as_ref(&self) -> &[u8] {
        &self.payload
    }
}

impl From<SerializedPayload> for Vec<u8> {
    fn from(payload: SerializedPayload) -> Self {
        payload.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_parts() {
        let p = SerializedPayload::new("application/json", b"{}".to_vec());
        assert_eq!(p.content_type(), "application/json");
        assert_eq!(p.payload(), b"{}");
        assert_eq!(p.as_bytes(), p.payload());
        assert_eq!(AsRef::<[u8]>::as_ref(&p), b"{}");
        assert_eq!(p.len(), 2);
        let (ct, bytes) = p.into_parts();
        assert_eq!(ct, "application/json");
        assert_eq!(bytes, b"{}");
    }
}
