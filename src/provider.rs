use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use dogstatsd::DogstatsdError;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    client::{GnortClient, StatSender},
    instrument::Emitter,
    meter::Meter,
    resource::Resource,
    scope::InstrumentationScope,
};

#[derive(Clone, Default)]
pub struct ProviderConfig {
    /// Falls back to [GnortClient::default] when unset.
    pub client: Option<Arc<dyn StatSender>>,
    /// Falls back to [Resource::from_env] when unset.
    pub resource: Option<Resource>,
}

impl ProviderConfig {
    pub fn with_client<C: StatSender + 'static>(mut self, client: C) -> Self {
        self.client = Some(Arc::new(client));
        self
    }
    pub fn with_shared_client(mut self, client: Arc<dyn StatSender>) -> Self {
        self.client = Some(client);
        self
    }
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Couldn't instantiate the default statsd client: {0}")]
    Client(#[from] DogstatsdError),
}

struct ProviderInner {
    emitter: Emitter,
    meters: Mutex<HashMap<InstrumentationScope, Arc<Meter>>>,
}

/// Hands out one [Meter] per instrumentation scope. Cloning shares the same registry.
#[derive(Clone)]
pub struct MeterProvider {
    inner: Arc<ProviderInner>,
}

impl MeterProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client: Arc<dyn StatSender> = match config.client {
            Some(client) => client,
            None => {
                debug!("No statsd client configured, using the default GnortClient.");
                Arc::new(GnortClient::default()?)
            }
        };
        let resource = config.resource.unwrap_or_else(Resource::from_env);
        Ok(Self {
            inner: Arc::new(ProviderInner {
                emitter: Emitter::new(client, Arc::new(resource)),
                meters: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Returns the meter for `(name, version, schema_url)`, creating it on first request.
    /// An empty name yields a fresh no-op meter that is not registered.
    pub fn get_meter(&self, name: &str, version: Option<&str>, schema_url: Option<&str>) -> Arc<Meter> {
        let scope = InstrumentationScope::new(name, version, schema_url);
        if name.is_empty() {
            warn!("Meter name cannot be empty, returning a no-op meter.");
            return Arc::new(Meter::noop(scope));
        }
        // Lookup and insert happen under one lock so a scope only ever gets one meter.
        let mut meters = self
            .inner
            .meters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        meters
            .entry(scope)
            .or_insert_with_key(|scope| {
                debug!("Creating meter for scope {scope}");
                Arc::new(Meter::new(scope.clone(), self.inner.emitter.clone()))
            })
            .clone()
    }

    /// Number of distinct scopes with a meter.
    pub fn meter_count(&self) -> usize {
        self.inner
            .meters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Barrier;

    use approx::assert_relative_eq;
    use maplit::btreemap;

    use super::*;
    use crate::{
        tags::KeyValue,
        test_support::{count_warnings, RecordingSender, SentKind},
    };

    fn provider(sender: Arc<RecordingSender>, resource: Resource) -> MeterProvider {
        MeterProvider::new(
            ProviderConfig::default()
                .with_shared_client(sender)
                .with_resource(resource),
        )
        .expect("Failed to build provider!")
    }

    #[test]
    fn test_counter_scenario() {
        let sender = RecordingSender::new();
        let provider = provider(sender.clone(), Resource::new([("service.name", "svc")]));
        let counter = provider.get_meter("name", None, None).create_counter("requests", "", "");
        counter.add(1, &[KeyValue::new("route", "/x")]);
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, SentKind::Increment);
        assert_eq!(sent[0].name, "requests");
        assert_relative_eq!(sent[0].value, 1.0);
        assert_eq!(
            sent[0].tags,
            Some(btreemap! {
                "service.name".to_string() => "svc".to_string(),
                "route".to_string() => "/x".to_string(),
            })
        );
    }

    #[test]
    fn test_histogram_scenario() {
        let sender = RecordingSender::new();
        let provider = provider(sender.clone(), Resource::empty());
        let histogram = provider.get_meter("name", None, None).create_histogram("latency", "", "");
        histogram.record(250, &[]);
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, SentKind::Timing);
        assert_eq!(sent[0].name, "latency");
        assert_relative_eq!(sent[0].value, 250.0);
        assert_eq!(sent[0].tags, None);
    }

    #[test]
    fn test_same_scope_same_meter() {
        let provider = provider(RecordingSender::new(), Resource::empty());
        let a = provider.get_meter("http", Some("1.0"), None);
        let b = provider.get_meter("http", Some("1.0"), None);
        assert!(Arc::ptr_eq(&a, &b));
        let c = provider.get_meter("http", Some("2.0"), None);
        let d = provider.get_meter("http", Some("1.0"), Some("https://schemas/1.0"));
        assert!(!Arc::ptr_eq(&a, &c));
        assert!(!Arc::ptr_eq(&a, &d));
        assert_eq!(provider.meter_count(), 3);
        // Clones share the registry.
        let cloned = provider.clone();
        assert!(Arc::ptr_eq(&a, &cloned.get_meter("http", Some("1.0"), None)));
        assert_eq!(a.scope().version(), Some("1.0"));
    }

    #[test]
    fn test_concurrent_get_meter() {
        let provider = provider(RecordingSender::new(), Resource::empty());
        let threads = 16;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let provider = provider.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    provider.get_meter("contended", Some("1"), None)
                })
            })
            .collect();
        let meters: Vec<Arc<Meter>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(meters.iter().all(|m| Arc::ptr_eq(m, &meters[0])));
        assert_eq!(provider.meter_count(), 1);
    }

    #[test]
    fn test_empty_name_is_noop() {
        let sender = RecordingSender::new();
        let provider = provider(sender.clone(), Resource::new([("service.name", "svc")]));
        let (meter, warnings) = count_warnings(|| provider.get_meter("", None, None));
        assert_eq!(warnings, 1);
        assert!(meter.is_noop());
        let (named, warnings) = count_warnings(|| provider.get_meter("named", None, None));
        assert_eq!(warnings, 0);
        assert!(!named.is_noop());
        meter.create_counter("c", "", "").add(1, &[]);
        meter.create_up_down_counter("u", "", "").add(-1, &[]);
        meter.create_histogram("h", "", "").record(1, &[]);
        meter.create_observable_gauge("g", vec![], "", "");
        assert_eq!(sender.len(), 0);
        assert_eq!(provider.meter_count(), 1);
    }

    #[test]
    fn test_observable_gauge_through_provider() {
        let sender = RecordingSender::new();
        let provider = provider(sender.clone(), Resource::empty());
        let callback: crate::instrument::Callback = Arc::new(Vec::new);
        let gauge = provider
            .get_meter("name", None, None)
            .create_observable_gauge("temperature", vec![callback], "C", "");
        let instrument: crate::instrument::Instrument = gauge.into();
        for amount in [0.0, 1.0, -1.0, f64::MAX, f64::NAN] {
            instrument.record(amount, &[KeyValue::new("k", "v")]);
        }
        assert_eq!(sender.len(), 0);
    }
}
