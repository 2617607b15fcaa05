use std::{collections::BTreeMap, env};

use tracing::debug;

use crate::tags::{AttributeValue, KeyValue};

pub const RESOURCE_ATTRIBUTES_ENV: &str = "OTEL_RESOURCE_ATTRIBUTES";
pub const SERVICE_NAME_ENV: &str = "OTEL_SERVICE_NAME";
pub const SERVICE_NAME_KEY: &str = "service.name";

/// Static attributes of the process emitting metrics. Never mutated once built;
/// the provider shares one copy by `Arc` with every meter and instrument.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resource {
    attributes: BTreeMap<String, AttributeValue>,
}

impl Resource {
    pub fn new<I, T>(attributes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<KeyValue>,
    {
        let attributes = attributes
            .into_iter()
            .map(|kv| {
                let kv = kv.into();
                (kv.key, kv.value)
            })
            .collect();
        Self { attributes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a resource from `OTEL_RESOURCE_ATTRIBUTES` and `OTEL_SERVICE_NAME`.
    /// The service name variable takes precedence over a `service.name` in the list.
    pub fn from_env() -> Self {
        let mut resource = env::var(RESOURCE_ATTRIBUTES_ENV)
            .map(|raw| Self::new(parse_attribute_list(&raw)))
            .unwrap_or_default();
        if let Ok(service_name) = env::var(SERVICE_NAME_ENV) {
            let service_name = service_name.trim();
            if !service_name.is_empty() {
                resource
                    .attributes
                    .insert(SERVICE_NAME_KEY.to_string(), service_name.into());
            }
        }
        resource
    }

    /// Returns a new resource with `other` layered on top of `self`.
    pub fn merge(&self, other: &Resource) -> Self {
        let mut attributes = self.attributes.clone();
        attributes.extend(
            other
                .attributes
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        Self { attributes }
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

fn parse_attribute_list(raw: &str) -> Vec<KeyValue> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Some(KeyValue::new(key.trim(), value.trim()))
            }
            _ => {
                debug!("Skipping malformed {RESOURCE_ATTRIBUTES_ENV} entry: {entry}");
                None
            }
        })
        .collect()
}
