use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    Layer, Registry,
};

use crate::{
    client::{StatSender, TransportError},
    tags::Tags,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SentKind {
    Increment,
    Timing,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SentStat {
    pub kind: SentKind,
    pub name: String,
    pub value: f64,
    pub tags: Option<Tags>,
}

/// Records every call instead of sending it anywhere.
#[derive(Default)]
pub(crate) struct RecordingSender {
    sent: Mutex<Vec<SentStat>>,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
    pub fn sent(&self) -> Vec<SentStat> {
        self.sent.lock().unwrap().clone()
    }
    pub fn len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
    fn push(&self, kind: SentKind, name: &str, value: f64, tags: Option<&Tags>) {
        self.sent.lock().unwrap().push(SentStat {
            kind,
            name: name.to_string(),
            value,
            tags: tags.cloned(),
        });
    }
}

impl StatSender for RecordingSender {
    fn increment(&self, name: &str, value: f64, tags: Option<&Tags>) -> Result<(), TransportError> {
        self.push(SentKind::Increment, name, value, tags);
        Ok(())
    }
    fn timing(&self, name: &str, value: f64, tags: Option<&Tags>) -> Result<(), TransportError> {
        self.push(SentKind::Timing, name, value, tags);
        Ok(())
    }
}

/// Counts `WARN` events.
#[derive(Clone, Default)]
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Runs `f` on this thread with a subscriber installed and returns how many warnings it logged.
pub(crate) fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let counter = WarnCounter::default();
    let subscriber = Registry::default().with(counter.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, counter.0.load(Ordering::SeqCst))
}

/// Always fails, for checking that transport errors stay inside the instrument.
pub(crate) struct FailingSender;

impl StatSender for FailingSender {
    fn increment(&self, _name: &str, _value: f64, _tags: Option<&Tags>) -> Result<(), TransportError> {
        Err(TransportError::Other("agent unreachable".to_string()))
    }
    fn timing(&self, _name: &str, _value: f64, _tags: Option<&Tags>) -> Result<(), TransportError> {
        Err(TransportError::Other("agent unreachable".to_string()))
    }
}
