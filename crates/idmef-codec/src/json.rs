//! JSON codec.
//!
//! Output is compact JSON with keys in the message's insertion order.
//! Numbers keep their JSON representation: integers stay integers and floats
//! stay floats, so there is no representational quirk to account for.

use idmef_core::{FieldMap, Message, SerializationError};
use serde_json::Value;

use crate::codec::Codec;

/// Content type served by default.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// [`Codec`] for JSON payloads.
#[derive(Debug, Clone)]
pub struct JsonCodec {
    content_type: String,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::with_content_type(JSON_CONTENT_TYPE)
    }
}

impl JsonCodec {
    /// Codec for `application/json`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve JSON under another content type, such as a private
    /// `application/<vendor>+json` type.
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
        }
    }
}

impl Codec for JsonCodec {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn encode(&self, message: &Message) -> Result<Vec<u8>, SerializationError> {
        serde_json::to_vec(message.fields())
            .map_err(|e| SerializationError::encode(&self.content_type, e))
    }

    fn decode(&self, payload: &[u8]) -> Result<FieldMap, SerializationError> {
        match serde_json::from_slice(payload) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(other) => Err(SerializationError::decode(
                &self.content_type,
                format!("expected a JSON object, found {}", kind(&other)),
            )),
            Err(e) => Err(SerializationError::decode(&self.content_type, e)),
        }
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sample() -> Message {
        let mut msg = Message::new();
        msg.insert("Version", "2.D.V03");
        msg.insert("ID", "09db946e-673e-49af-b4b2-a8cd9da58de6");
        msg.insert("Confidence", 0.5);
        msg.insert(
            "Analyzer",
            json!({"IP": "127.0.0.1", "Category": ["LOG"], "Data": ["Log"]}),
        );
        msg
    }

    #[test]
    fn encodes_compact_in_insertion_order() {
        let bytes = JsonCodec::new().encode(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(r#"{"Version":"2.D.V03","ID":"#), "{text}");
        assert!(!text.contains('\n'));
    }

    #[test]
    fn decode_inverts_encode() {
        let codec = JsonCodec::new();
        let msg = sample();
        let fields = codec.decode(&codec.encode(&msg).unwrap()).unwrap();
        assert_eq!(Message::from_fields(fields), msg);
    }

    #[test]
    fn decode_rejects_corrupt_bytes() {
        let err = JsonCodec::new().decode(b"{\"Version\": ").unwrap_err();
        assert!(matches!(err, SerializationError::Decode { .. }));
    }

    #[test]
    fn decode_rejects_non_object() {
        let err = JsonCodec::new().decode(b"[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"), "{err}");
    }

    #[test]
    fn custom_content_type() {
        let codec = JsonCodec::with_content_type("application/idmefv2+json");
        assert_eq!(codec.content_type(), "application/idmefv2+json");
    }

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 .:-]{0,16}".prop_map(Value::String),
        ]
    }

    fn value() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[A-Za-z]{1,8}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn round_trips_arbitrary_field_sets(
            fields in prop::collection::btree_map("[A-Za-z]{1,10}", value(), 0..6)
        ) {
            let msg: Message = fields.into_iter().collect();
            let codec = JsonCodec::new();
            let decoded = codec.decode(&codec.encode(&msg).unwrap()).unwrap();
            prop_assert_eq!(Message::from_fields(decoded), msg);
        }
    }
}
