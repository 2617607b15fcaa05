use std::{env, sync::Arc};

use dogstatsd::*;
use thiserror::Error;

use crate::tags::Tags;

pub const STATSD_HOST_ENV: &str = "STATSD_HOST";
pub const STATSD_PORT_ENV: &str = "STATSD_PORT";
const DEFAULT_ORIGIN: &str = "0.0.0.0:0";
// Port 8125(UDP) is for metrics,
// port 8126(TCP) is for Datadog APM (tracing)

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "8125";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("dogstatsd client error: {0}")]
    Dogstatsd(#[from] DogstatsdError),
    #[error("transport error: {0}")]
    Other(String),
}

/// The wire-protocol side of the meter provider. Instruments call into this and
/// never look at the result beyond logging it.
pub trait StatSender: Send + Sync {
    fn increment(&self, name: &str, value: f64, tags: Option<&Tags>) -> Result<(), TransportError>;
    fn timing(&self, name: &str, value: f64, tags: Option<&Tags>) -> Result<(), TransportError>;
}

/// Default [StatSender] backed by a dogstatsd client.
#[derive(Clone)]
pub struct GnortClient {
    /// The Arc around the dogstatsd client is a hack to work around the lack of a native Clone implementation.
    client: Arc<Client>,
}

/// Datadog unified service tagging variables and the tag each one becomes.
const UNIFIED_SERVICE_ENV: [(&str, &str); 3] = [
    ("DD_ENV", "env"),
    ("DD_VERSION", "version"),
    ("DD_SERVICE", "service"),
];

fn unified_service_tags() -> impl Iterator<Item = String> {
    UNIFIED_SERVICE_ENV
        .into_iter()
        .filter_map(|(var, key)| env::var(var).ok().map(|value| format!("{key}:{value}")))
}

fn statsd_target() -> String {
    let host = env::var(STATSD_HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var(STATSD_PORT_ENV).unwrap_or_else(|_| DEFAULT_PORT.to_string());
    format!("{host}:{port}")
}

/// dogstatsd tags are `key:value` strings.
pub(crate) fn flatten_tags(tags: Option<&Tags>) -> Vec<String> {
    tags.map(|tags| {
        tags.iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect()
    })
    .unwrap_or_default()
}

/// Count and timing packets only carry integers. `as` saturates on overflow and maps NaN to 0.
fn to_wire_int(value: f64) -> i64 {
    value.round() as i64
}

impl GnortClient {
    /// No namespace, only the `DD_*` tags.
    pub fn default() -> Result<Self, DogstatsdError> {
        Self::new(None, std::iter::empty::<&str>())
    }

    /// `extra_default_tags` are `key:value` strings sent with every stat after the `DD_*` ones.
    pub fn new<I, T>(namespace: Option<&str>, extra_default_tags: I) -> Result<Self, DogstatsdError>
    where
        T: AsRef<str>,
        I: IntoIterator<Item = T>,
    {
        let mut extra: Vec<String> = extra_default_tags
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .collect();
        extra.sort();
        let client = Client::new(Options {
            socket_path: None,
            batching_options: None,
            default_tags: unified_service_tags().chain(extra).collect(),
            from_addr: DEFAULT_ORIGIN.to_string(),
            to_addr: statsd_target(),
            namespace: namespace.unwrap_or_default().to_string(),
        })?;
        Ok(Self {
            client: Arc::new(client),
        })
    }
}

impl StatSender for GnortClient {
    fn increment(&self, name: &str, value: f64, tags: Option<&Tags>) -> Result<(), TransportError> {
        self.client
            .count(name, to_wire_int(value), flatten_tags(tags))
            .map_err(TransportError::from)
    }

    fn timing(&self, name: &str, value: f64, tags: Option<&Tags>) -> Result<(), TransportError> {
        self.client
            .timing(name, to_wire_int(value), flatten_tags(tags))
            .map_err(TransportError::from)
    }
}
