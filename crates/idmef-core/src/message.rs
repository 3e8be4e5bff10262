//! # IDMEFv2 Message
//!
//! A [`Message`] is an ordered mapping from field name to a JSON-like value.
//! The set of required and forbidden keys is defined entirely by the schema
//! resolved from the message's own `Version` field; nothing is hard-coded
//! here.
//!
//! Messages are created empty, mutated freely, and validated on demand.
//! Mutation never triggers validation. Insertion order does not affect
//! equality or validation, but it is preserved so that codecs which care
//! about byte stability reproduce the original order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::IdmefError;
use crate::version::VersionToken;

/// The ordered field mapping underlying a message.
pub type FieldMap = Map<String, Value>;

/// Name of the field carrying the message's draft version.
pub const VERSION_FIELD: &str = "Version";

/// One IDMEFv2 event record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message {
    fields: FieldMap,
}

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a message from an already decoded field mapping.
    pub fn from_fields(fields: FieldMap) -> Self {
        Self { fields }
    }

    /// Set a field, returning the previous value if one was present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a field for in-place mutation.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Remove a field, preserving the order of the remaining fields.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    /// True if the field is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the message has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in insertion order.
    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.fields.iter()
    }

    /// Iterate over field names in insertion order.
    pub fn keys(&self) -> serde_json::map::Keys<'_> {
        self.fields.keys()
    }

    /// Borrow the underlying field mapping.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Consume the message and return its field mapping.
    pub fn into_fields(self) -> FieldMap {
        self.fields
    }

    /// The message as a JSON object value, as handed to the validator.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// The raw `Version` field, if present and a string.
    pub fn version(&self) -> Option<&str> {
        self.fields.get(VERSION_FIELD).and_then(Value::as_str)
    }

    /// Extract the version token from the `Version` field.
    ///
    /// # Errors
    ///
    /// Returns [`IdmefError::MalformedVersion`] if the field is absent, is not
    /// a string, or does not follow the `<major>.D.V<minor>` grammar.
    pub fn version_token(&self) -> Result<VersionToken, IdmefError> {
        match self.fields.get(VERSION_FIELD) {
            None => Err(IdmefError::MalformedVersion { found: None }),
            Some(Value::String(s)) => VersionToken::parse_field(s),
            Some(other) => Err(IdmefError::malformed_version(other.to_string())),
        }
    }
}

impl From<FieldMap> for Message {
    fn from(fields: FieldMap) -> Self {
        Self::from_fields(fields)
    }
}

impl From<Message> for Value {
    fn from(message: Message) -> Self {
        Value::Object(message.fields)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Message {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<K: Into<String>> Extend<(K, Value)> for Message {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        self.fields
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl IntoIterator for Message {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Message {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_message_is_empty() {
        let msg = Message::new();
        assert!(msg.is_empty());
        assert_eq!(msg.version(), None);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut msg = Message::new();
        msg.insert("Version", "2.D.V03");
        msg.insert("ID", "abc");
        msg.insert("CreateTime", "2021-01-01T00:00:00Z");
        let keys: Vec<&str> = msg.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Version", "ID", "CreateTime"]);

        msg.remove("ID");
        let keys: Vec<&str> = msg.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Version", "CreateTime"]);
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let mut a = Message::new();
        a.insert("Version", "2.D.V03");
        a.insert("ID", "abc");
        let mut b = Message::new();
        b.insert("ID", "abc");
        b.insert("Version", "2.D.V03");
        assert_eq!(a, b);
    }

    #[test]
    fn insert_returns_previous_value() {
        let mut msg = Message::new();
        assert_eq!(msg.insert("Priority", "Low"), None);
        assert_eq!(msg.insert("Priority", "High"), Some(json!("Low")));
    }

    #[test]
    fn version_token_from_field() {
        let mut msg = Message::new();
        msg.insert("Version", "2.D.V03");
        assert_eq!(msg.version_token().unwrap().as_str(), "03");
    }

    #[test]
    fn version_token_missing_or_wrong_type() {
        let msg = Message::new();
        assert!(matches!(
            msg.version_token(),
            Err(IdmefError::MalformedVersion { found: None })
        ));

        let mut msg = Message::new();
        msg.insert("Version", 3);
        assert!(matches!(
            msg.version_token(),
            Err(IdmefError::MalformedVersion { found: Some(_) })
        ));
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut msg = Message::new();
        msg.insert("Version", "2.D.V03");
        msg.insert("Analyzer", json!({"Name": "foobar"}));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"Version": "2.D.V03", "Analyzer": {"Name": "foobar"}}));

        let back: Message = serde_json::from_value(value).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn collect_and_extend() {
        let mut msg: Message = vec![("Version", json!("2.D.V03"))].into_iter().collect();
        msg.extend(vec![("ID".to_string(), json!("x"))]);
        assert_eq!(msg.len(), 2);
        assert!(msg.contains_key("ID"));
    }
}
