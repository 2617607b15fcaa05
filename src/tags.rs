use std::collections::BTreeMap;

use derive_more::{Display, From};

use crate::resource::Resource;

/// Flattened `key -> value` tags as they go over the wire.
pub type Tags = BTreeMap<String, String>;

/// Scalar attribute value. `Display` is the text that ends up in the tag.
#[derive(Clone, Debug, Display, From, PartialEq)]
pub enum AttributeValue {
    String(String),
    Bool(bool),
    I64(i64),
    F64(f64),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::I64(value as i64)
    }
}

/// A single attribute pair supplied at the call site.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: AttributeValue,
}

impl KeyValue {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> From<(K, V)> for KeyValue {
    fn from((key, value): (K, V)) -> Self {
        KeyValue::new(key, value)
    }
}

/// Merges the resource attributes with the call-site attributes.
/// Call-site attributes win on key collision, and later pairs win over earlier ones.
/// Returns `None` rather than an empty map when there is nothing to send.
pub fn encode_tags(resource: &Resource, attributes: &[KeyValue]) -> Option<Tags> {
    let mut tags: Tags = resource
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    for attribute in attributes {
        tags.insert(attribute.key.clone(), attribute.value.to_string());
    }
    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}
